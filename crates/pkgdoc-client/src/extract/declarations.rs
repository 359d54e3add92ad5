//! Constants, variables, functions, types and examples.
//!
//! Every lookup is scoped to its enclosing block and skips matches nested in
//! a boundary element (a method inside a type, an example inside a function),
//! so sibling entities never leak into each other.

use pkgdoc_core::models::{Constant, Example, Function, Type, TypeKind, Variable};
use regex::Regex;
use scraper::{ElementRef, Html, Selector};

use super::fields::{non_empty, text_of};
use crate::consts::{
    CONST_HEAD_REGEX, CONSTANT_BLOCK, CONSTANT_NAME, DECLARATION_CLASS, DECLARATION_PRE,
    DEPRECATED_TAG, EXAMPLE, EXAMPLE_CODE, EXAMPLE_HEADER, EXAMPLE_OUTPUT, FUNC_NAME_REGEX,
    FUNCTION_BLOCK, HEADER, OVERVIEW_EXAMPLE, PARAGRAPH, PRE, RECEIVER_REGEX, SINCE,
    SINCE_VERSION, TYPE_BLOCK, TYPE_BOUNDARY, TYPE_FUNC, TYPE_HEAD_REGEX, TYPE_METHOD,
    VAR_HEAD_REGEX, VARIABLE_BLOCK, VARIABLE_NAME,
};

/// How a function-like block is named and filtered.
struct CallableKind {
    /// Prefix for synthesized names, e.g. `method` → `method-2`.
    positional: &'static str,
    /// Free functions are dropped without a signature; members are kept if
    /// they have a signature or any header text.
    require_signature: bool,
}

const FREE_FUNCTION: CallableKind = CallableKind {
    positional: "function",
    require_signature: true,
};

const METHOD: CallableKind = CallableKind {
    positional: "method",
    require_signature: false,
};

const CONSTRUCTOR: CallableKind = CallableKind {
    positional: "constructor",
    require_signature: false,
};

pub(crate) fn constants(doc: &Html) -> Vec<Constant> {
    doc.select(&CONSTANT_BLOCK)
        .enumerate()
        .filter_map(|(i, block)| {
            let decl = declaration(block, &CONSTANT_NAME, &CONST_HEAD_REGEX, "const-block", i + 1)?;
            Some(Constant {
                name: decl.name,
                r#type: decl.annotation,
                value: decl.text,
                description: trailing_description(block),
            })
        })
        .collect()
}

pub(crate) fn variables(doc: &Html) -> Vec<Variable> {
    doc.select(&VARIABLE_BLOCK)
        .enumerate()
        .filter_map(|(i, block)| {
            let decl = declaration(block, &VARIABLE_NAME, &VAR_HEAD_REGEX, "var-block", i + 1)?;
            Some(Variable {
                name: decl.name,
                declaration: decl.text,
                description: trailing_description(block),
            })
        })
        .collect()
}

pub(crate) fn functions(doc: &Html) -> Vec<Function> {
    doc.select(&FUNCTION_BLOCK)
        .enumerate()
        .filter_map(|(i, block)| callable(block, &FREE_FUNCTION, i + 1))
        .collect()
}

pub(crate) fn types(doc: &Html) -> Vec<Type> {
    doc.select(&TYPE_BLOCK)
        .enumerate()
        .filter_map(|(i, block)| type_block(block, i + 1))
        .collect()
}

/// Package-level examples from the overview section.
pub(crate) fn package_examples(doc: &Html) -> Vec<Example> {
    doc.select(&OVERVIEW_EXAMPLE).map(example).collect()
}

struct Declaration {
    name: String,
    /// Type annotation of a single `const`, if any.
    annotation: String,
    text: String,
}

/// Shared by constant and variable blocks: text of the first `pre`, named by
/// its anchored span, the declaration head, or position.
fn declaration(
    block: ElementRef<'_>,
    name_selector: &Selector,
    head: &Regex,
    positional: &str,
    position: usize,
) -> Option<Declaration> {
    let pre = block.select(&PRE).next()?;
    let text = non_empty(&code_text(pre))?;
    let caps = head.captures(&text);

    let name = pre
        .select(name_selector)
        .find_map(|span| non_empty(span.value().attr("id")?))
        .or_else(|| caps.as_ref().map(|c| c[1].to_string()))
        .unwrap_or_else(|| format!("{positional}-{position}"));
    let annotation = caps
        .as_ref()
        .and_then(|c| c.get(2))
        .map(|m| m.as_str().trim().to_string())
        .unwrap_or_default();

    Some(Declaration {
        name,
        annotation,
        text,
    })
}

/// First `p` after the block, stopping at the next declaration.
fn trailing_description(block: ElementRef<'_>) -> String {
    block
        .next_siblings()
        .filter_map(ElementRef::wrap)
        .take_while(|el| !DECLARATION_CLASS.matches(el))
        .find(|el| el.value().name() == "p")
        .map(text_of)
        .unwrap_or_default()
}

fn callable(block: ElementRef<'_>, kind: &CallableKind, position: usize) -> Option<Function> {
    let boundary = &*EXAMPLE;
    let signature = scoped_code(block, &DECLARATION_PRE, boundary).unwrap_or_default();
    if kind.require_signature && signature.is_empty() {
        return None;
    }

    let header = scoped(block, &HEADER, boundary).next();
    let header_text = header.map(text_of).unwrap_or_default();
    if signature.is_empty() && header_text.is_empty() && header_id(header).is_none() {
        return None;
    }

    let name = header_id(header)
        .or_else(|| capture(&FUNC_NAME_REGEX, &signature))
        .or_else(|| non_empty(&header_text))
        .unwrap_or_else(|| format!("{}-{position}", kind.positional));

    Some(Function {
        name,
        receiver: capture(&RECEIVER_REGEX, &signature).unwrap_or_default(),
        description: scoped_text(block, &PARAGRAPH, boundary).unwrap_or_default(),
        deprecated: scoped(block, &DEPRECATED_TAG, boundary).next().is_some(),
        added_in: added_in(block, boundary),
        examples: block.select(&EXAMPLE).map(example).collect(),
        signature,
    })
}

fn type_block(block: ElementRef<'_>, position: usize) -> Option<Type> {
    let boundary = &*TYPE_BOUNDARY;
    let definition = scoped_code(block, &DECLARATION_PRE, boundary)?;
    let header = scoped(block, &HEADER, boundary).next();

    let name = header_id(header)
        .or_else(|| capture(&TYPE_HEAD_REGEX, &definition))
        .unwrap_or_else(|| format!("type-{position}"));

    let members = |selector: &Selector, kind: &CallableKind| -> Vec<Function> {
        block
            .select(selector)
            .enumerate()
            .filter_map(|(i, el)| callable(el, kind, i + 1))
            .collect()
    };

    Some(Type {
        name,
        kind: type_kind(&definition),
        description: scoped_text(block, &PARAGRAPH, boundary).unwrap_or_default(),
        deprecated: scoped(block, &DEPRECATED_TAG, boundary).next().is_some(),
        added_in: added_in(block, boundary),
        constructors: members(&TYPE_FUNC, &CONSTRUCTOR),
        methods: members(&TYPE_METHOD, &METHOD),
        examples: scoped(block, &EXAMPLE, boundary).map(example).collect(),
        definition,
    })
}

/// Derive the kind label from a `type` declaration head.
pub(crate) fn type_kind(definition: &str) -> TypeKind {
    let Some(caps) = TYPE_HEAD_REGEX.captures(definition) else {
        return TypeKind::Type;
    };
    if caps.get(2).is_some() {
        return TypeKind::Alias;
    }
    match caps.get(3).map(|m| m.as_str()) {
        Some("struct") => TypeKind::Struct,
        Some("interface") => TypeKind::Interface,
        Some("func") => TypeKind::Func,
        _ => TypeKind::Type,
    }
}

fn example(el: ElementRef<'_>) -> Example {
    let name = el
        .select(&EXAMPLE_HEADER)
        .next()
        .and_then(|h| non_empty(&text_of(h).replace('¶', "")))
        .or_else(|| {
            el.value()
                .attr("id")
                .and_then(|id| non_empty(id.trim_start_matches("example-")))
        })
        .unwrap_or_default();

    let first_code = |selector: &Selector| {
        el.select(selector)
            .next()
            .and_then(|c| non_empty(&code_text(c)))
            .unwrap_or_default()
    };

    Example {
        name,
        code: first_code(&EXAMPLE_CODE),
        output: first_code(&EXAMPLE_OUTPUT),
    }
}

fn added_in(block: ElementRef<'_>, boundary: &Selector) -> String {
    scoped_text(block, &SINCE_VERSION, boundary)
        .or_else(|| {
            scoped_text(block, &SINCE, boundary)
                .and_then(|t| non_empty(t.strip_prefix("added in").unwrap_or(&t)))
        })
        .unwrap_or_default()
}

fn header_id(header: Option<ElementRef<'_>>) -> Option<String> {
    non_empty(header?.value().attr("id")?)
}

fn capture(regex: &Regex, text: &str) -> Option<String> {
    regex
        .captures(text)
        .and_then(|c| c.get(1))
        .and_then(|m| non_empty(m.as_str()))
}

/// Descendants of `scope` matching `selector`, minus anything nested in a
/// `boundary` element below `scope`.
fn scoped<'a>(
    scope: ElementRef<'a>,
    selector: &'a Selector,
    boundary: &'a Selector,
) -> impl Iterator<Item = ElementRef<'a>> + 'a {
    scope
        .select(selector)
        .filter(move |el| !inside_boundary(*el, scope, boundary))
}

fn inside_boundary(el: ElementRef<'_>, scope: ElementRef<'_>, boundary: &Selector) -> bool {
    el.ancestors()
        .take_while(|node| node.id() != scope.id())
        .filter_map(ElementRef::wrap)
        .any(|ancestor| boundary.matches(&ancestor))
}

fn scoped_text(scope: ElementRef<'_>, selector: &Selector, boundary: &Selector) -> Option<String> {
    scoped(scope, selector, boundary).find_map(|el| non_empty(&text_of(el)))
}

/// Text of the first match with line structure preserved.
fn scoped_code(scope: ElementRef<'_>, selector: &Selector, boundary: &Selector) -> Option<String> {
    let el = scoped(scope, selector, boundary).next()?;
    non_empty(&code_text(el))
}

fn code_text(el: ElementRef<'_>) -> String {
    el.text().collect()
}
