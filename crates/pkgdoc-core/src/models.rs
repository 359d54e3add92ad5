use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::error::AppError;

/// Structured documentation for one package page.
///
/// Every field defaults to its empty value; an absent field on the page is
/// not an error.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Package {
    pub name: String,
    pub description: String,
    pub synopsis: String,
    pub module: String,
    pub version: String,
    pub is_latest: bool,
    pub published: String,
    pub license: String,
    pub license_url: String,
    pub repository: String,
    /// Primary external identifier, e.g. `github.com/spf13/cobra`.
    pub import_path: String,
    pub scraped_at: Option<DateTime<Utc>>,
    /// README subtree exactly as it appeared in the page.
    pub readme: String,
    /// README reduced to Markdown.
    pub processed_readme: String,
    pub imports: u64,
    pub imported_by: u64,
    pub functions: Vec<Function>,
    pub types: Vec<Type>,
    pub variables: Vec<Variable>,
    pub constants: Vec<Constant>,
    pub examples: Vec<Example>,
}

/// A function or method declaration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Function {
    pub name: String,
    pub description: String,
    pub signature: String,
    /// Receiver type for methods, e.g. `*Command`; empty for free functions.
    pub receiver: String,
    pub deprecated: bool,
    pub added_in: String,
    pub examples: Vec<Example>,
}

/// A type declaration with its constructors and methods.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Type {
    pub name: String,
    pub description: String,
    pub definition: String,
    pub kind: TypeKind,
    pub deprecated: bool,
    pub added_in: String,
    pub constructors: Vec<Function>,
    pub methods: Vec<Function>,
    pub examples: Vec<Example>,
}

/// Shape of a type definition, derived from its declaration text.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TypeKind {
    Struct,
    Interface,
    Func,
    Alias,
    #[default]
    Type,
}

impl TypeKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            TypeKind::Struct => "struct",
            TypeKind::Interface => "interface",
            TypeKind::Func => "func",
            TypeKind::Alias => "alias",
            TypeKind::Type => "type",
        }
    }
}

impl std::fmt::Display for TypeKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A package-level variable block.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Variable {
    pub name: String,
    /// Full declaration text.
    pub declaration: String,
    pub description: String,
}

/// A package-level constant block.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Constant {
    pub name: String,
    pub r#type: String,
    /// Full declaration text.
    pub value: String,
    pub description: String,
}

/// A runnable example attached to a package, function or type.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Example {
    pub name: String,
    pub code: String,
    pub output: String,
}

/// Cache persistence unit: one row per import path, last write wins.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Document {
    pub id: String,
    pub package: Package,
    pub raw_html: String,
    /// SHA-256 of `raw_html`.
    pub content_hash: String,
}

impl Document {
    pub fn new(id: impl Into<String>, package: Package, raw_html: String) -> Self {
        let content_hash = compute_hash(&raw_html);
        Self {
            id: id.into(),
            package,
            raw_html,
            content_hash,
        }
    }
}

/// Output of a single extractor run.
///
/// The raw markup is always captured, even when structured extraction fails.
#[derive(Debug)]
pub struct PageExtraction {
    pub raw_html: String,
    pub package: Result<Package, AppError>,
}

/// Where a scraped package came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PackageSource {
    Cache,
    Fetched,
}

/// A successfully produced package plus its raw page.
#[derive(Debug, Clone)]
pub struct ScrapedPackage {
    pub package: Package,
    pub raw_html: String,
    pub source: PackageSource,
}

/// Compute a SHA-256 hash of a string, returned as 64-char hex.
pub fn compute_hash(content: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(content.as_bytes());
    format!("{:x}", hasher.finalize())
}
