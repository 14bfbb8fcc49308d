// Copyright (c) Ken Kocienda and other contributors.
//
// This source code is licensed under the MIT license found in the
// LICENSE file in the root directory of this source tree.

//! Round-trip and traversal tests for the tugscope-cst parser.
//!
//! `render(parse(code)) == code` must hold for every input the parser
//! accepts. Renaming goes through the same printer, so any drift here
//! shows up as noise in rename output.

use std::time::{Duration, Instant};

use tugscope_core::patch::Span;
use tugscope_core::types::SourceId;
use tugscope_cst::visitor::{transform_source_file, walk_source_file, VisitResult, Visitor};
use tugscope_cst::{codegen, parse_source, Ident, IdentRole, ScopeKind, SourceFile};

const PROGRAM: &str = r#"// Package shapes has a little of everything.
package shapes

import (
	"fmt"
	m "math"
)

type Point struct {
	X, Y float64
}

func (p *Point) Dist(q Point) float64 {
	dx := p.X - q.X
	dy := p.Y - q.Y
	return m.Sqrt(dx*dx + dy*dy)
}

/* Sum adds up
   a list. */
func Sum(values ...int) (total int) {
	for _, v := range values {
		total += v
	}
	return
}

func main() {
	var pts []Point
	apply := func(f func(x int) int, n int) int { return f(n) }
	for i := 0; i < 3; i++ {
		if i == 1 {
			continue
		} else if i > 1 {
			break
		}
		pts = append(pts, pts[0])
	}
	fmt.Println(len(pts), apply(func(x int) int { return x * 2 }, 4), Sum(1, 2, 3))
}
"#;

fn parse(text: &str) -> SourceFile {
    parse_source(text, SourceId(0)).unwrap_or_else(|e| panic!("{e}"))
}

fn assert_roundtrip(text: &str) {
    let file = parse(text);
    let rendered = codegen::render(&file).unwrap();
    assert_eq!(rendered, text);
}

#[derive(Default)]
struct Roles {
    seen: Vec<(Ident, IdentRole)>,
    scopes: Vec<ScopeKind>,
}

impl Visitor for Roles {
    fn visit_ident(&mut self, ident: &Ident, role: IdentRole) -> VisitResult {
        self.seen.push((ident.clone(), role));
        VisitResult::Continue
    }

    fn enter_scope(&mut self, kind: ScopeKind, _span: Span) -> VisitResult {
        self.scopes.push(kind);
        VisitResult::Continue
    }
}

fn roles(text: &str) -> Roles {
    let file = parse(text);
    let mut roles = Roles::default();
    walk_source_file(&mut roles, &file);
    roles
}

fn role_of(roles: &Roles, name: &str) -> Vec<IdentRole> {
    roles
        .seen
        .iter()
        .filter(|(ident, _)| ident.name == name)
        .map(|(_, r)| *r)
        .collect()
}

#[test]
fn roundtrip_program() {
    assert_roundtrip(PROGRAM);
}

#[test]
fn roundtrip_small_inputs() {
    for text in [
        "",
        "\n",
        "package p\n",
        "var x = 1",
        "var x = 1;",
        "{\na := 0\na++\n}\n{\na := 2\na--\n}",
        "x := 1 // trailing\n",
        "const (\n\tA = iota\n\tB\n)\n",
        "func f() {}\n",
    ] {
        assert_roundtrip(text);
    }
}

#[test]
fn roundtrip_after_rename() {
    let mut file = parse(PROGRAM);
    transform_source_file(
        &mut |ident: &mut Ident| {
            if ident.name == "dx" {
                ident.name = "deltaX".to_string();
            }
        },
        &mut file,
    );
    let renamed = codegen::render(&file).unwrap();
    assert!(renamed.contains("deltaX := p.X - q.X"));
    assert!(renamed.contains("m.Sqrt(deltaX*deltaX + dy*dy)"));
    assert_eq!(renamed.len(), PROGRAM.len() + 3 * ("deltaX".len() - "dx".len()));

    let reparsed = parse(&renamed);
    assert_eq!(codegen::render(&reparsed).unwrap(), renamed);
}

#[test]
fn roles_across_program() {
    let roles = roles(PROGRAM);
    assert_eq!(role_of(&roles, "shapes"), vec![IdentRole::Package]);
    assert_eq!(role_of(&roles, "m"), vec![IdentRole::Declaration, IdentRole::Reference]);
    assert_eq!(role_of(&roles, "Sqrt"), vec![IdentRole::Member]);
    assert_eq!(role_of(&roles, "Dist"), vec![IdentRole::Member]);
    assert_eq!(role_of(&roles, "Sum")[0], IdentRole::Declaration);
    assert!(role_of(&roles, "X").iter().all(|r| *r == IdentRole::Member));
    // The parameter name inside a function type binds nothing.
    assert_eq!(
        role_of(&roles, "x"),
        vec![IdentRole::Member, IdentRole::Declaration, IdentRole::Reference]
    );
}

#[test]
fn scopes_across_program() {
    let roles = roles(PROGRAM);
    assert_eq!(roles.scopes[0], ScopeKind::File);
    let functions = roles
        .scopes
        .iter()
        .filter(|k| **k == ScopeKind::Function)
        .count();
    // Three declarations and two literals.
    assert_eq!(functions, 5);
    assert_eq!(roles.scopes.iter().filter(|k| **k == ScopeKind::For).count(), 2);
    // `if` plus its `else if`.
    assert_eq!(roles.scopes.iter().filter(|k| **k == ScopeKind::If).count(), 2);
}

/// `depth` function literals, each passed to a call that wraps the next.
fn nested_literals(depth: usize, open: &str, close: &str) -> String {
    let mut text = open.repeat(depth);
    text.push_str("x++\n");
    text.push_str(&close.repeat(depth));
    text
}

#[test]
fn nested_func_literals_parse_in_linear_time() {
    for (open, close) in [
        ("f(func() {\n", "})\n"),
        ("if g(func() {\n", "}) {\n}\n"),
        ("for h(func() {\n", "}) {\n}\n"),
    ] {
        let text = nested_literals(12, open, close);
        let started = Instant::now();
        let file = parse(&text);
        let elapsed = started.elapsed();
        assert!(
            elapsed < Duration::from_secs(2),
            "{open:?} nested 12 deep took {elapsed:?}"
        );

        assert_eq!(codegen::render(&file).unwrap(), text);
        let functions = roles(&text)
            .scopes
            .iter()
            .filter(|kind| **kind == ScopeKind::Function)
            .count();
        assert_eq!(functions, 12, "{open:?}");
    }
}

#[test]
fn parse_error_reports_line_and_column() {
    let err = parse_source("a := 1\nb := )\n", SourceId(0)).unwrap_err();
    assert_eq!(err.line, 2);
    assert_eq!(err.column, 6);
    assert!(err.to_string().starts_with("parse error at 2:6"));
}

#[test]
fn positions_are_one_indexed() {
    let file = parse("var otherString = 1\nvar myString = 2\n");
    let mut roles = Roles::default();
    walk_source_file(&mut roles, &file);
    let found: Vec<_> = roles
        .seen
        .iter()
        .map(|(ident, _)| {
            let position = file.position_of(ident);
            (ident.name.as_str(), position.line, position.column)
        })
        .collect();
    assert_eq!(found, vec![("otherString", 1, 5), ("myString", 2, 5)]);
}
