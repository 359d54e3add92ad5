use std::fmt::{self, Write};

use crate::models::{Example, Function, Package, Type};

use super::{format_thousands, format_timestamp};

/// Render a package as a pkg.go.dev-style Markdown document.
pub fn render_markdown(pkg: &Package) -> String {
    let mut out = String::with_capacity(4096);
    // fmt::Write for String is infallible.
    let _ = write_markdown(&mut out, pkg);
    out
}

pub fn write_markdown<W: Write>(w: &mut W, pkg: &Package) -> fmt::Result {
    writeln!(w, "# {} package - {}\n", pkg.name, pkg.import_path)?;
    write_metadata(w, pkg)?;

    let overview = if pkg.synopsis.is_empty() {
        &pkg.description
    } else {
        &pkg.synopsis
    };
    if !overview.is_empty() {
        writeln!(w, "## Overview\n\n{overview}\n")?;
    }

    writeln!(w, "## README\n")?;
    if !pkg.processed_readme.is_empty() {
        w.write_str(&pkg.processed_readme)?;
    } else {
        w.write_str(&pkg.readme)?;
    }
    writeln!(w, "\n")?;

    writeln!(w, "## Documentation\n\n### Index\n")?;
    write_index(w, pkg)?;

    if !pkg.constants.is_empty() {
        writeln!(w, "### Constants\n")?;
        for c in &pkg.constants {
            writeln!(w, "#### {}\n", c.name)?;
            write_declaration(w, &c.value, "const ", "Value")?;
            if !c.r#type.is_empty() {
                writeln!(w, "**Type:** `{}`\n", c.r#type)?;
            }
            if !c.description.is_empty() {
                writeln!(w, "{}\n", c.description)?;
            }
        }
    }

    if !pkg.variables.is_empty() {
        writeln!(w, "### Variables\n")?;
        for v in &pkg.variables {
            writeln!(w, "#### {}\n", v.name)?;
            write_declaration(w, &v.declaration, "var ", "Type")?;
            if !v.description.is_empty() {
                writeln!(w, "{}\n", v.description)?;
            }
        }
    }

    if !pkg.functions.is_empty() {
        writeln!(w, "### Functions\n")?;
        for f in &pkg.functions {
            writeln!(w, "#### {}\n", f.name)?;
            write_function_body(w, f)?;
        }
    }

    if !pkg.types.is_empty() {
        writeln!(w, "### Types\n")?;
        for t in &pkg.types {
            write_type(w, t)?;
        }
    }

    if !pkg.examples.is_empty() {
        writeln!(w, "### Examples\n")?;
        write_examples(w, &pkg.examples)?;
    }

    writeln!(w, "\n*Scraped at: {}*", format_timestamp(pkg.scraped_at))
}

fn write_metadata<W: Write>(w: &mut W, pkg: &Package) -> fmt::Result {
    writeln!(w, "## Package Documentation\n")?;
    if !pkg.import_path.is_empty() {
        writeln!(w, "**Import Path:** `{}`\n", pkg.import_path)?;
    }
    if !pkg.module.is_empty() {
        writeln!(w, "**Module:** {}\n", pkg.module)?;
    }
    if !pkg.version.is_empty() {
        let latest = if pkg.is_latest { " (Latest)" } else { "" };
        writeln!(w, "**Version:** {}{latest}\n", pkg.version)?;
    }
    if !pkg.published.is_empty() {
        writeln!(w, "**Published:** {}\n", pkg.published)?;
    }
    if pkg.imports > 0 {
        writeln!(w, "**Imports:** {}\n", pkg.imports)?;
    }
    if pkg.imported_by > 0 {
        writeln!(w, "**Imported By:** {}\n", format_thousands(pkg.imported_by))?;
    }
    match (pkg.license.is_empty(), pkg.license_url.is_empty()) {
        (false, false) => writeln!(w, "**License:** [{}]({})\n", pkg.license, pkg.license_url)?,
        (false, true) => writeln!(w, "**License:** {}\n", pkg.license)?,
        _ => {}
    }
    if !pkg.repository.is_empty() {
        let label = pkg
            .repository
            .strip_prefix("https://")
            .or_else(|| pkg.repository.strip_prefix("http://"))
            .unwrap_or(&pkg.repository);
        writeln!(w, "**Repository:** [{label}]({})\n", pkg.repository)?;
    }
    Ok(())
}

fn write_index<W: Write>(w: &mut W, pkg: &Package) -> fmt::Result {
    if !pkg.constants.is_empty() {
        writeln!(w, "#### Constants")?;
        for c in &pkg.constants {
            writeln!(w, "- [`{}`](#pkg-constants)", c.name)?;
        }
        writeln!(w)?;
    }
    if !pkg.variables.is_empty() {
        writeln!(w, "#### Variables")?;
        for v in &pkg.variables {
            writeln!(w, "- [`{}`](#pkg-variables)", v.name)?;
        }
        writeln!(w)?;
    }
    if !pkg.functions.is_empty() {
        writeln!(w, "#### Functions")?;
        for f in &pkg.functions {
            writeln!(w, "- [`{0}`](#{0})", f.name)?;
        }
        writeln!(w)?;
    }
    if !pkg.types.is_empty() {
        writeln!(w, "#### Types")?;
        for t in &pkg.types {
            writeln!(w, "- [`{0}`](#{0})", t.name)?;
        }
        writeln!(w)?;
    }
    Ok(())
}

/// Multi-line or keyword-led declarations go in a fence, short ones inline.
fn write_declaration<W: Write>(w: &mut W, text: &str, keyword: &str, label: &str) -> fmt::Result {
    if text.is_empty() {
        return Ok(());
    }
    if text.contains('\n') || text.contains(keyword) {
        write_go_fence(w, text)
    } else {
        writeln!(w, "**{label}:** `{text}`\n")
    }
}

fn write_go_fence<W: Write>(w: &mut W, code: &str) -> fmt::Result {
    writeln!(w, "```go\n{code}\n```\n")
}

fn write_function_body<W: Write>(w: &mut W, f: &Function) -> fmt::Result {
    if !f.signature.is_empty() {
        write_go_fence(w, &f.signature)?;
    }
    if !f.description.is_empty() {
        writeln!(w, "{}", f.description)?;
    }
    write_tags(w, &f.added_in, f.deprecated)?;
    writeln!(w)?;
    write_examples(w, &f.examples)
}

fn write_type<W: Write>(w: &mut W, t: &Type) -> fmt::Result {
    writeln!(w, "#### {}\n", t.name)?;
    if !t.definition.is_empty() {
        write_go_fence(w, &t.definition)?;
    }
    writeln!(w, "**Kind:** {}\n", t.kind)?;
    if !t.description.is_empty() {
        writeln!(w, "{}", t.description)?;
    }
    write_tags(w, &t.added_in, t.deprecated)?;
    writeln!(w)?;

    if !t.constructors.is_empty() {
        writeln!(w, "##### Constructors\n")?;
        for c in &t.constructors {
            writeln!(w, "###### {}\n", c.name)?;
            write_function_body(w, c)?;
        }
    }
    if !t.methods.is_empty() {
        writeln!(w, "##### Methods\n")?;
        for m in &t.methods {
            writeln!(w, "###### {}\n", m.name)?;
            write_function_body(w, m)?;
        }
    }
    write_examples(w, &t.examples)
}

fn write_tags<W: Write>(w: &mut W, added_in: &str, deprecated: bool) -> fmt::Result {
    if !added_in.is_empty() {
        writeln!(w, "_Since: {added_in}_")?;
    }
    if deprecated {
        writeln!(w, "**deprecated**")?;
    }
    Ok(())
}

fn write_examples<W: Write>(w: &mut W, examples: &[Example]) -> fmt::Result {
    for ex in examples {
        if !ex.name.is_empty() {
            writeln!(w, "###### {}\n", ex.name)?;
        }
        if !ex.code.is_empty() {
            write_go_fence(w, &ex.code)?;
        }
        if !ex.output.is_empty() {
            writeln!(w, "**Output:**\n```\n{}\n```\n", ex.output)?;
        }
    }
    Ok(())
}
