//! JavaScript side of the associator, on top of oxc.
//!
//! The oxc AST lives in an arena that does not outlive the file pass, so every
//! node that a doc-comment claims is lowered into an owned [`CodeNode`] on the
//! spot.

use std::path::Path;

use oxc_allocator::Allocator;
use oxc_ast::ast::{
    Argument, AssignmentTarget, BindingPattern, BindingPatternKind, Expression, FormalParameters,
    Function, ObjectExpression, ObjectProperty, ObjectPropertyKind, Statement,
};
use oxc_ast_visit::{Visit, walk};
use oxc_parser::Parser;
use oxc_span::{GetSpan, SourceType, Span};

use super::body::scan_body;
use super::{Associator, Docset, LineIndex, RawComment};
use crate::code::{CodeNode, FunctionNode, Literal, LiteralKind, PropertyNode, Section};
use crate::error::{DocsError, Result};

/// Parse `source` and pair each comment with the node that follows it.
pub fn associate(path: &Path, source: &str, namespaces: &[String]) -> Result<Vec<Docset>> {
    let allocator = Allocator::default();
    let parsed = Parser::new(&allocator, source, SourceType::cjs()).parse();
    let index = LineIndex::new(source);

    if !parsed.errors.is_empty() || parsed.panicked {
        let offset = parsed
            .errors
            .first()
            .and_then(|err| err.labels.as_ref())
            .and_then(|labels| labels.first())
            .map_or(0, |label| label.offset() as u32);
        let (line, column) = index.location(offset);
        let diagnostics: Vec<String> = parsed.errors.iter().map(|err| err.to_string()).collect();
        return Err(DocsError::parse_error(path.to_path_buf(), line, column, &diagnostics));
    }

    let program = parsed.program;
    let comments = program
        .comments
        .iter()
        .map(|comment| RawComment {
            start: comment.span.start,
            end: comment.span.end,
            line_comment: comment.is_line(),
            doc: comment.is_jsdoc(),
            content: slice(source, comment.content_span()).to_string(),
        })
        .collect();

    let mut anchors = Anchors {
        source,
        namespaces,
        index: &index,
        assoc: Associator::new(source, comments, &index),
        sections: Vec::new(),
    };
    anchors.visit_program(&program);
    Ok(anchors.assoc.into_docsets())
}

fn slice(source: &str, span: Span) -> &str {
    source
        .get(span.start as usize..span.end as usize)
        .unwrap_or_default()
}

/// Walks every statement, object property and call argument, the positions a
/// doc-comment can annotate.
struct Anchors<'s> {
    source: &'s str,
    namespaces: &'s [String],
    index: &'s LineIndex,
    assoc: Associator<'s>,
    /// Section of properties inside the object currently walked.
    sections: Vec<Section>,
}

impl<'s> Anchors<'s> {
    fn with_section(&mut self, section: Section, f: impl FnOnce(&mut Self)) {
        self.sections.push(section);
        f(self);
        self.sections.pop();
    }
}

impl<'a, 's> Visit<'a> for Anchors<'s> {
    fn visit_statement(&mut self, stmt: &Statement<'a>) {
        let start = stmt.span().start;
        if let Some(idx) = self.assoc.claimable(start) {
            let node = lower_statement(stmt, self.source);
            self.assoc.attach(idx, node);
        } else if let Some(node) = undocumented_define(stmt, self.source, self.namespaces) {
            self.assoc.implicit(start, self.index.line(start), node);
        }
        self.with_section(Section::Plain, |this| walk::walk_statement(this, stmt));
    }

    fn visit_object_property(&mut self, prop: &ObjectProperty<'a>) {
        let section = self.sections.last().copied().unwrap_or_default();
        if let Some(idx) = self.assoc.claimable(prop.span.start) {
            let node = lower_property(prop, section, self.source)
                .map_or(CodeNode::Other, |node| CodeNode::Property(Box::new(node)));
            self.assoc.attach(idx, node);
        }
        let child = child_section(prop);
        self.with_section(child, |this| walk::walk_object_property(this, prop));
    }

    fn visit_argument(&mut self, arg: &Argument<'a>) {
        if let Some(idx) = self.assoc.claimable(arg.span().start) {
            let node = arg
                .as_expression()
                .map_or(CodeNode::Other, |expr| lower_expression(expr, self.source));
            self.assoc.attach(idx, node);
        }
        self.with_section(Section::Plain, |this| walk::walk_argument(this, arg));
    }
}

/// `Ns.define('Name', ...)` statement with no doc-comment of its own, where
/// `Ns` is one of `namespaces`.
fn undocumented_define(stmt: &Statement<'_>, source: &str, namespaces: &[String]) -> Option<CodeNode> {
    let Statement::ExpressionStatement(expr) = stmt else {
        return None;
    };
    let Expression::CallExpression(call) = &expr.expression else {
        return None;
    };
    let named = matches!(call.arguments.first(), Some(Argument::StringLiteral(_)));
    let callee = chain(&call.callee)?;
    let framework = namespaces.iter().any(|ns| {
        callee
            .strip_prefix(ns.as_str())
            .is_some_and(|rest| rest == ".define")
    });
    (named && framework).then(|| lower_expression(&expr.expression, source))
}

/// Section for the properties of `prop`'s value.
fn child_section(prop: &ObjectProperty<'_>) -> Section {
    if !matches!(prop.value, Expression::ObjectExpression(_)) {
        return Section::Plain;
    }
    prop.key
        .static_name()
        .and_then(|key| Section::from_key(&key))
        .unwrap_or_default()
}

pub(crate) fn lower_statement(stmt: &Statement<'_>, source: &str) -> CodeNode {
    match stmt {
        Statement::ExpressionStatement(expr) => lower_expression(&expr.expression, source),
        Statement::VariableDeclaration(decl) => {
            let Some(first) = decl.declarations.first() else {
                return CodeNode::Other;
            };
            match binding_name(&first.id) {
                Some(name) => CodeNode::Declaration {
                    name,
                    value: first
                        .init
                        .as_ref()
                        .map(|init| Box::new(lower_expression(init, source))),
                },
                None => CodeNode::Other,
            }
        }
        Statement::FunctionDeclaration(func) => CodeNode::Function(lower_function(func)),
        _ => CodeNode::Other,
    }
}

pub(crate) fn lower_expression(expr: &Expression<'_>, source: &str) -> CodeNode {
    match expr {
        Expression::FunctionExpression(func) => CodeNode::Function(lower_function(func)),
        Expression::ArrowFunctionExpression(arrow) => CodeNode::Function(FunctionNode {
            name: None,
            params: param_names(&arrow.params),
            body: scan_body(&arrow.body),
        }),
        Expression::CallExpression(call) => CodeNode::Call {
            callee: chain(&call.callee),
            args: call
                .arguments
                .iter()
                .map(|arg| {
                    arg.as_expression()
                        .map_or(CodeNode::Other, |expr| lower_expression(expr, source))
                })
                .collect(),
        },
        Expression::AssignmentExpression(assign) => match target_chain(&assign.left) {
            Some(target) => CodeNode::Assignment {
                target,
                value: Box::new(lower_expression(&assign.right, source)),
            },
            None => CodeNode::Other,
        },
        Expression::ObjectExpression(obj) => lower_object(obj, Section::Plain, source),
        Expression::ArrayExpression(array) => CodeNode::Array {
            items: array
                .elements
                .iter()
                .filter_map(|el| el.as_expression())
                .map(|expr| lower_expression(expr, source))
                .collect(),
            raw: slice(source, array.span).to_string(),
        },
        Expression::StringLiteral(lit) => literal(LiteralKind::String, lit.value.to_string(), lit.span, source),
        Expression::NumericLiteral(lit) => {
            let raw = slice(source, lit.span).to_string();
            literal(LiteralKind::Number, raw, lit.span, source)
        }
        Expression::BooleanLiteral(lit) => literal(LiteralKind::Boolean, lit.value.to_string(), lit.span, source),
        Expression::NullLiteral(lit) => literal(LiteralKind::Null, "null".to_string(), lit.span, source),
        Expression::RegExpLiteral(lit) => {
            let raw = slice(source, lit.span).to_string();
            literal(LiteralKind::Regex, raw, lit.span, source)
        }
        // `-1`, `+2.5`
        Expression::UnaryExpression(unary) => {
            let raw = slice(source, unary.span);
            if raw.parse::<f64>().is_ok() {
                literal(LiteralKind::Number, raw.to_string(), unary.span, source)
            } else {
                CodeNode::Other
            }
        }
        Expression::ParenthesizedExpression(inner) => lower_expression(&inner.expression, source),
        Expression::Identifier(_) | Expression::StaticMemberExpression(_) | Expression::ThisExpression(_) => {
            chain(expr).map_or(CodeNode::Other, CodeNode::Identifier)
        }
        _ => CodeNode::Other,
    }
}

fn literal(kind: LiteralKind, value: String, span: Span, source: &str) -> CodeNode {
    CodeNode::Literal(Literal {
        kind,
        value,
        raw: slice(source, span).to_string(),
    })
}

fn lower_function(func: &Function<'_>) -> FunctionNode {
    FunctionNode {
        name: func.id.as_ref().map(|id| id.name.to_string()),
        params: param_names(&func.params),
        body: func.body.as_ref().map(|body| scan_body(body)).unwrap_or_default(),
    }
}

fn lower_object(obj: &ObjectExpression<'_>, section: Section, source: &str) -> CodeNode {
    CodeNode::Object {
        props: obj
            .properties
            .iter()
            .filter_map(|kind| match kind {
                ObjectPropertyKind::ObjectProperty(prop) => lower_property(prop, section, source),
                ObjectPropertyKind::SpreadProperty(_) => None,
            })
            .collect(),
        raw: slice(source, obj.span).to_string(),
    }
}

fn lower_property(prop: &ObjectProperty<'_>, section: Section, source: &str) -> Option<PropertyNode> {
    let key = prop.key.static_name()?.to_string();
    let value = match &prop.value {
        Expression::ObjectExpression(obj) => {
            let child = Section::from_key(&key).unwrap_or_default();
            lower_object(obj, child, source)
        }
        other => lower_expression(other, source),
    };
    Some(PropertyNode { key, value, section })
}

fn param_names(params: &FormalParameters<'_>) -> Vec<String> {
    let mut names: Vec<String> = params
        .items
        .iter()
        .filter_map(|param| binding_name(&param.pattern))
        .collect();
    if let Some(rest) = &params.rest {
        names.extend(binding_name(&rest.argument));
    }
    names
}

fn binding_name(pattern: &BindingPattern<'_>) -> Option<String> {
    match &pattern.kind {
        BindingPatternKind::BindingIdentifier(ident) => Some(ident.name.to_string()),
        BindingPatternKind::AssignmentPattern(assign) => binding_name(&assign.left),
        _ => None,
    }
}

/// Dotted name of an identifier / `this` / static member chain.
fn chain(expr: &Expression<'_>) -> Option<String> {
    match expr {
        Expression::Identifier(ident) => Some(ident.name.to_string()),
        Expression::ThisExpression(_) => Some("this".to_string()),
        Expression::StaticMemberExpression(member) => {
            let object = chain(&member.object)?;
            Some(format!("{object}.{}", member.property.name))
        }
        Expression::ParenthesizedExpression(inner) => chain(&inner.expression),
        _ => None,
    }
}

fn target_chain(target: &AssignmentTarget<'_>) -> Option<String> {
    match target {
        AssignmentTarget::AssignmentTargetIdentifier(ident) => Some(ident.name.to_string()),
        AssignmentTarget::StaticMemberExpression(member) => {
            let object = chain(&member.object)?;
            Some(format!("{object}.{}", member.property.name))
        }
        _ => None,
    }
}
