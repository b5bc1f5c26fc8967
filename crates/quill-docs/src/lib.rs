#![deny(clippy::all)]

//! Documentation extraction and class-graph resolution for framework-style
//! JavaScript and SCSS.
//!
//! This crate provides:
//! - Comment/code association for JavaScript (via OXC) and SCSS.
//! - A doc-tag parser and a closure-compiler style type-expression parser.
//! - Merging of documented and detected facts into classes and members.
//! - An inheritance-aware class graph with enrichment passes.
//! - A JSON generator for the finished graph.

pub mod aggregator;
pub mod associate;
pub mod code;
pub mod config;
pub mod detect;
pub mod doctag;
pub mod error;
pub mod extractor;
pub mod merger;
pub mod model;
pub mod passes;
pub mod relations;
pub mod type_expr;
pub mod warnings;

#[cfg(feature = "json")]
pub mod generators;

pub use config::{DocsConfig, ImportSpec, PassOptions};
pub use error::{DocsError, Result};
pub use extractor::{Documentation, Extractor};
pub use merger::DocFragment;
pub use model::{Class, ClassId, Member, MemberLink, Param, SourceLocation, Tagname};
pub use relations::{MemberFilter, Relations};
pub use type_expr::{KnownTypes, LinkResolver, TypeParser};
pub use warnings::{WarnKind, Warning, Warnings};

#[cfg(feature = "json")]
pub use generators::json::render_json;
