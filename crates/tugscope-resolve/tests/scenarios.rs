//! End-to-end behavior of the resolution engine on Go snippets.
//!
//! Each test parses real source, so these exercise the parser, the walk
//! functions and the resolver together.

use tugscope_core::types::{Position, SourceId};
use tugscope_cst::{codegen, parse_source, ScopeKind, SourceFile};
use tugscope_resolve::{RenameTransformer, ScopeBuilder, ScopeTree, SymbolLocator};

const FIXTURE: &str = r#"package main

import f "fmt"

var total = 0

func A(n int) (err error) {
	integerVariable := n
	for i := 0; i < integerVariable; i++ {
		total += i
	}
	if v := integerVariable; v > 2 {
		integerVariable := v * 2
		f.Println(integerVariable)
	} else {
		integerVariable--
	}
	return nil
}

func B() {
	integerVariable := 2
	defer func(x int) {
		integerVariable += x
	}(1)
	for k, v := range list {
		go use(k, v, integerVariable)
	}
}
"#;

fn parse(text: &str) -> SourceFile {
    parse_source(text, SourceId(0)).unwrap_or_else(|e| panic!("{e}"))
}

fn coords(positions: &[Position]) -> Vec<(u32, u32)> {
    positions.iter().map(|p| (p.line, p.column)).collect()
}

fn rename(text: &str, from: &str, to: &str, row: u32, column: u32) -> String {
    let mut file = parse(text);
    RenameTransformer::new(from, to, row, column)
        .apply(&mut file)
        .unwrap();
    codegen::render(&file).unwrap()
}

fn build(text: &str) -> (SourceFile, ScopeTree) {
    let file = parse(text);
    let tree = ScopeBuilder::new(&file).build().unwrap();
    (file, tree)
}

mod properties {
    use super::*;

    #[test]
    fn sites_lie_in_their_scope_and_outside_its_children() {
        let (_, tree) = build(FIXTURE);
        assert!(tree.len() > 8);
        for scope in tree.iter() {
            for (name, positions) in scope.sites() {
                for position in positions {
                    assert!(
                        scope.span.contains(&position.span),
                        "{name} at {position} escapes {}",
                        scope.id
                    );
                    for &child in &scope.children {
                        assert!(
                            !tree.scope(child).span.contains(&position.span),
                            "{name} at {position} belongs to child {child}"
                        );
                    }
                }
            }
        }
    }

    #[test]
    fn declarations_are_sites() {
        let (_, tree) = build(FIXTURE);
        for scope in tree.iter() {
            for name in scope.names() {
                if let Some(decl) = scope.get_declaration(name) {
                    assert!(scope.get_sites(name).contains(decl));
                }
            }
        }
    }

    #[test]
    fn declaring_scope_is_deterministic() {
        let (_, first) = build(FIXTURE);
        let (_, second) = build(FIXTURE);
        for scope in first.iter() {
            for name in scope.names() {
                let a = first.declaring_scope(scope.id, name);
                let b = second.declaring_scope(scope.id, name);
                assert_eq!(a, b);
                if let Some(found) = a {
                    // Nothing between the scope and its declaring scope
                    // declares the name.
                    for between in first.ancestors(scope.id) {
                        if between.id == found {
                            break;
                        }
                        assert!(!between.has_declaration(name));
                    }
                }
            }
        }
    }

    #[test]
    fn unmodified_tree_renders_identically() {
        let file = parse(FIXTURE);
        assert_eq!(codegen::render(&file).unwrap(), FIXTURE);
    }

    #[test]
    fn rename_and_back_restores_text() {
        let renamed = rename(FIXTURE, "integerVariable", "iv", 8, 2);
        assert_ne!(renamed, FIXTURE);
        let restored = rename(&renamed, "iv", "integerVariable", 8, 2);
        assert_eq!(restored, FIXTURE);
    }

    #[test]
    fn renamed_set_equals_binding_occurrences() {
        let file = parse(FIXTURE);
        let locator = SymbolLocator::new(&file).unwrap();
        for (row, column) in [(8, 2), (13, 3), (22, 2), (24, 3), (5, 5), (26, 9)] {
            let binding = locator.binding_occurrences_at(row, column).unwrap().unwrap();
            let mut copy = file.clone();
            let outcome = RenameTransformer::new(&binding.resolved.symbol.name, "zz", row, column)
                .apply(&mut copy)
                .unwrap();
            assert_eq!(outcome.renamed, binding.occurrences, "anchor {row}:{column}");
        }
    }
}

mod shadowing {
    use super::*;

    #[test]
    fn rename_in_one_function_leaves_the_other() {
        let out = rename(FIXTURE, "integerVariable", "iv", 8, 2);
        assert!(out.contains("\tiv := n\n"));
        assert!(out.contains("i < iv;"));
        assert!(out.contains("if v := iv; v > 2"));
        assert!(out.contains("\t\tiv--\n"));
        // The shadowing declaration in the if branch is a different binding.
        assert!(out.contains("\t\tintegerVariable := v * 2\n"));
        assert!(out.contains("f.Println(integerVariable)"));
        // Function B is untouched.
        assert!(out.contains("\tintegerVariable := 2\n"));
        assert!(out.contains("integerVariable += x"));
    }

    #[test]
    fn closures_capture_the_enclosing_binding() {
        let out = rename(FIXTURE, "integerVariable", "count", 22, 2);
        assert!(out.contains("\tcount := 2\n"));
        assert!(out.contains("count += x"));
        assert!(out.contains("go use(k, v, count)"));
        assert!(out.contains("\tintegerVariable := n\n"));
    }

    #[test]
    fn package_level_variable_renames_through_functions() {
        let out = rename(FIXTURE, "total", "sum", 5, 5);
        assert!(out.contains("var sum = 0"));
        assert!(out.contains("sum += i"));
    }

    #[test]
    fn selectors_are_never_renamed() {
        let out = rename(FIXTURE, "f", "fmtpkg", 3, 8);
        assert!(out.contains("import fmtpkg \"fmt\""));
        assert!(out.contains("fmtpkg.Println"));
    }
}

mod scenarios {
    use super::*;

    #[test]
    fn symbol_at_declaration() {
        let file = parse("var myString = \"Hello World\";");
        let locator = SymbolLocator::new(&file).unwrap();
        assert_eq!(locator.get_symbol_at(1, 5).unwrap().name, "myString");
        assert!(locator.get_symbol_at(1, 3).is_none());
    }

    #[test]
    fn symbol_at_on_second_line() {
        let file = parse("var otherString = \"other string\";\nvar myString = \"Hello World\";");
        let locator = SymbolLocator::new(&file).unwrap();
        assert_eq!(locator.get_symbol_at(2, 5).unwrap().name, "myString");
        assert_eq!(locator.get_symbol_at(1, 5).unwrap().name, "otherString");
    }

    #[test]
    fn positions_stay_within_one_function() {
        let text = "func A() {\n\tintegerVariable := 1\n\tprintln(integerVariable)\n}\n\nfunc B() {\n\tintegerVariable := 1\n\tprintln(integerVariable)\n}\n";
        let file = parse(text);
        let locator = SymbolLocator::new(&file).unwrap();
        let found = locator.positions_for_symbol_at(2, 2).unwrap().unwrap();
        assert_eq!(found.groups.len(), 1);
        assert_eq!(found.groups[0].kind, ScopeKind::Function);
        assert_eq!(coords(&found.flatten()), vec![(2, 2), (3, 10)]);
    }

    #[test]
    fn rename_first_of_two_sibling_blocks() {
        let out = rename("{\na := 0\na++\n}\n{\na := 2\na--\n}", "a", "b", 2, 1);
        assert_eq!(out, "{\nb := 0\nb++\n}\n{\na := 2\na--\n}");
    }

    #[test]
    fn rename_from_nested_block_reaches_declaration() {
        let out = rename("{\nvar fld int = 0\n{\nfld += 5\n}\n}", "fld", "newFld", 4, 1);
        assert_eq!(out, "{\nvar newFld int = 0\n{\nnewFld += 5\n}\n}");
    }
}
