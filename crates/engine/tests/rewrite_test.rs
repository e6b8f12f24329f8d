//! End-to-end rewriting of `template` properties

use pretty_assertions::assert_eq;
use tplfold_core::{QuoteStyle, TransformKind};
use tplfold_engine::transform::{Identity, MinifyHtml, Uppercase};
use tplfold_engine::{
    builtin, rewriter, Program, RewriteOptions, RewrittenUnit, SkipReason, TemplateTransform,
    TransformError, TraversalError,
};

fn rewrite(source: &str, transform: &dyn TemplateTransform) -> RewrittenUnit {
    let program = Program::from_sources([("component.ts", source)]).expect("parse fixture");
    program
        .rewrite_all(transform, RewriteOptions::default())
        .remove(0)
}

#[test]
fn test_concatenation_with_identity() {
    let unit = rewrite(r#"const c = { template: "<a>" + "<b>" };"#, &Identity);
    assert_eq!(unit.source, r#"const c = { template: "<a><b>" };"#);
}

#[test]
fn test_function_reference_is_left_alone() {
    let source = r#"
function someFunctionRef() {}
const c = { template: "<a>" + someFunctionRef };
"#;
    let unit = rewrite(source, &Uppercase);

    assert_eq!(unit.source, source);
    assert_eq!(unit.skipped.len(), 1);
    match &unit.skipped[0].reason {
        SkipReason::Traversal {
            error: TraversalError::UnresolvedReference { path, .. },
        } => assert_eq!(path, "someFunctionRef"),
        other => panic!("unexpected {other:?}"),
    }
}

#[test]
fn test_template_with_number_and_uppercase() {
    let unit = rewrite("const c = { template: `x${1e3}y` };", &Uppercase);
    assert_eq!(unit.source, r#"const c = { template: "X1000Y" };"#);
}

#[test]
fn test_rewrite_is_idempotent() {
    let first = rewrite(
        "const c = { template: `<p>\n  ${'hi'}\n</p>` + '<br>' };",
        &MinifyHtml,
    );
    assert!(first.is_changed());
    assert_eq!(first.source, r#"const c = { template: "<p> hi </p><br>" };"#);

    let second = rewrite(&first.source, &MinifyHtml);
    assert!(!second.is_changed());
    assert_eq!(second.unchanged, 1);
    assert_eq!(second.source, first.source);
}

#[test]
fn test_constants_resolve_across_script_files() {
    let program = Program::from_sources([
        ("constants.ts", "const enum Css { Row = 'row' }\nconst TAG = 'section';"),
        (
            "view.ts",
            "const view = { template: `<${TAG} class=\"${Css.Row}\"></${TAG}>` };",
        ),
    ])
    .expect("parse fixtures");

    let units = program.rewrite_all(&Identity, RewriteOptions::default());
    assert!(!units[0].is_changed());
    assert_eq!(
        units[1].source,
        r#"const view = { template: "<section class=\"row\"></section>" };"#
    );
}

#[test]
fn test_module_exports_are_not_visible_without_import() {
    let program = Program::from_sources([
        ("constants.ts", "export const TAG = 'section';"),
        ("view.ts", "import { TAG } from './constants';\nexport default { template: '<' + TAG + '>' };"),
    ])
    .expect("parse fixtures");

    let units = program.rewrite_all(&Identity, RewriteOptions::default());
    assert!(!units[1].is_changed());
    assert_eq!(units[1].skipped.len(), 1);
}

#[test]
fn test_nested_occurrences_are_independent() {
    let source = r#"
const routes = [
  {
    template: '<outer>' + broken(),
    children: [{ template: '<inner>' + '</inner>' }],
  },
  { template: '<ok>' + '</ok>', nested: { template: 'never' + 'seen' } },
];
"#;
    let unit = rewrite(source, &Identity);

    let literals: Vec<&str> = unit
        .replacements
        .iter()
        .map(|replacement| replacement.literal.as_str())
        .collect();
    assert_eq!(
        literals,
        vec![
            r#""<inner></inner>""#,
            r#""<ok></ok>""#,
            r#""neverseen""#
        ]
    );
    assert_eq!(unit.skipped.len(), 1);
    assert!(unit.source.contains("'<outer>' + broken()"));
}

#[test]
fn test_transform_failure_keeps_original() {
    let source = "const c = { template: '<p>' + '<!-- open' };";
    let unit = rewrite(source, builtin(TransformKind::Minify).as_ref());

    assert_eq!(unit.source, source);
    assert_eq!(
        unit.skipped[0].reason,
        SkipReason::Transform {
            error: TransformError::rejected("unterminated HTML comment")
        }
    );
}

#[test]
fn test_non_entry_values_are_reported() {
    let unit = rewrite("const c = { template: render() };", &Identity);
    assert_eq!(
        unit.skipped[0].reason,
        SkipReason::NotEntryNode {
            kind: "call_expression".to_string()
        }
    );
}

#[test]
fn test_rewriter_over_single_unit() {
    let program = Program::from_sources([(
        "widget.js",
        "module.exports = { template: '<i>' + \"it's\" + '</i>' };",
    )])
    .expect("parse fixture");
    let options = RewriteOptions {
        quote_style: QuoteStyle::Single,
        ..RewriteOptions::default()
    };
    let pass = rewriter(program.symbols(), &Identity, options);
    let unit = pass.rewrite(&program.units()[0]);

    assert_eq!(
        unit.source,
        r"module.exports = { template: '<i>it\'s</i>' };"
    );
    assert_eq!(unit.replacements[0].location.start_line, 1);
}

#[test]
fn test_lone_surrogates_are_not_folded() {
    for source in [
        r"const c = { template: `a\u{D800}b` };",
        r"const c = { template: '<a>' + '\uDC00' };",
    ] {
        let unit = rewrite(source, &Identity);
        assert_eq!(unit.source, source);
        assert!(unit.replacements.is_empty());
        assert!(matches!(
            unit.skipped[0].reason,
            SkipReason::Traversal {
                error: TraversalError::NonTraversableNode { .. }
            }
        ));
    }
}

#[test]
fn test_values_next_to_syntax_errors_are_not_folded() {
    let source = "const c = { template: 'a' + 'b' + };";
    let unit = rewrite(source, &Identity);

    assert_eq!(unit.source, source);
    assert!(unit.replacements.is_empty());
    assert!(!unit.skipped.is_empty());
    assert!(unit
        .skipped
        .iter()
        .all(|occurrence| occurrence.reason == SkipReason::SyntaxError));
}
