//! Static scan of a function body for fired events and `this.method()` calls.

use oxc_ast::ast::{
    BindingPatternKind, CallExpression, Expression, FunctionBody, Statement, VariableDeclarator,
};
use oxc_ast_visit::{Visit, walk};
use rustc_hash::FxHashSet;

use crate::code::BodyFacts;
use crate::model::push_unique;

const FIRE_METHODS: &[&str] = &["fireEvent", "fireEventArgs"];

/// Scan a function body. `this` and locals initialised with `this` count as
/// the receiver.
pub fn scan_body(body: &FunctionBody<'_>) -> BodyFacts {
    let mut scanner = BodyScanner::default();
    scanner.visit_function_body(body);
    let mut facts = scanner.facts;
    facts.returns_this = body
        .statements
        .last()
        .is_some_and(|stmt| scanner_returns_this(stmt, &scanner.this_aliases));
    facts
}

#[derive(Default)]
struct BodyScanner {
    this_aliases: FxHashSet<String>,
    facts: BodyFacts,
}

impl BodyScanner {
    fn is_receiver(&self, expr: &Expression<'_>) -> bool {
        is_this(expr, &self.this_aliases)
    }
}

fn is_this(expr: &Expression<'_>, aliases: &FxHashSet<String>) -> bool {
    match expr {
        Expression::ThisExpression(_) => true,
        Expression::Identifier(ident) => aliases.contains(ident.name.as_str()),
        Expression::ParenthesizedExpression(inner) => is_this(&inner.expression, aliases),
        _ => false,
    }
}

fn scanner_returns_this(stmt: &Statement<'_>, aliases: &FxHashSet<String>) -> bool {
    match stmt {
        Statement::ReturnStatement(ret) => ret
            .argument
            .as_ref()
            .is_some_and(|arg| is_this(arg, aliases)),
        _ => false,
    }
}

impl<'a> Visit<'a> for BodyScanner {
    fn visit_variable_declarator(&mut self, decl: &VariableDeclarator<'a>) {
        if let (BindingPatternKind::BindingIdentifier(ident), Some(init)) = (&decl.id.kind, &decl.init) {
            if self.is_receiver(init) {
                self.this_aliases.insert(ident.name.to_string());
            }
        }
        walk::walk_variable_declarator(self, decl);
    }

    fn visit_call_expression(&mut self, call: &CallExpression<'a>) {
        if let Expression::StaticMemberExpression(member) = &call.callee {
            if self.is_receiver(&member.object) {
                let method = member.property.name.as_str();
                if FIRE_METHODS.contains(&method) {
                    let event = call
                        .arguments
                        .first()
                        .and_then(|arg| arg.as_expression())
                        .and_then(|expr| match expr {
                            Expression::StringLiteral(lit) => Some(lit.value.to_string()),
                            _ => None,
                        });
                    if let Some(event) = event {
                        push_unique(&mut self.facts.fires, event);
                    }
                } else {
                    push_unique(&mut self.facts.method_calls, method);
                }
            }
        }
        walk::walk_call_expression(self, call);
    }
}

#[cfg(test)]
mod tests {
    use oxc_allocator::Allocator;
    use oxc_parser::Parser;
    use oxc_span::SourceType;

    use super::*;

    fn facts(source: &str) -> BodyFacts {
        let allocator = Allocator::default();
        let parsed = Parser::new(&allocator, source, SourceType::cjs()).parse();
        assert!(parsed.errors.is_empty());
        let Some(Statement::FunctionDeclaration(func)) = parsed.program.body.first() else {
            panic!("expected a function declaration");
        };
        scan_body(func.body.as_ref().unwrap())
    }

    #[test]
    fn collects_fired_events_and_calls_in_order() {
        let facts = facts(
            "function f() { this.fireEvent('before'); this.doWork(1); this.fireEvent('after'); this.doWork(); other.call(); }",
        );
        assert_eq!(facts.fires, vec!["before", "after"]);
        assert_eq!(facts.method_calls, vec!["doWork"]);
        assert!(!facts.returns_this);
    }

    #[test]
    fn follows_me_alias_into_callbacks() {
        let facts = facts(
            "function f() { var me = this; items.forEach(function () { me.fireEvent('item'); me.refresh(); }); return me; }",
        );
        assert_eq!(facts.fires, vec!["item"]);
        assert_eq!(facts.method_calls, vec!["refresh"]);
        assert!(facts.returns_this);
    }

    #[test]
    fn chainable_body() {
        let facts = facts("function f() { this.x = 1; return this; }");
        assert!(facts.returns_this);
    }
}
