//! End-to-end formatter tests: exact-output checks for the layout rules,
//! idempotence over representative programs, and a naga re-parse of the
//! formatted output.

use wgslfmt::{format_embedded, format_str, FormatOptions};

fn fmt(source: &str) -> String {
    format_str(source, &FormatOptions::default()).expect("format error")
}

fn fmt_width(source: &str, print_width: usize) -> String {
    let options = FormatOptions {
        print_width,
        indent_width: 2,
    };
    format_str(source, &options).expect("format error")
}

fn fmt_host(source: &str) -> String {
    format_embedded(source, &FormatOptions::default()).expect("format error")
}

// ── whole programs ──────────────────────────────────────────────────────

#[test]
fn add_function_end_to_end() {
    assert_eq!(
        fmt("fn add(a:f32,b:f32)->f32{return a+b;}"),
        "fn add(a: f32, b: f32) -> f32 {\n  return a + b;\n}\n"
    );
}

const CASES: &[&str] = &[
    "fn add(a:f32,b:f32)->f32{return a+b;}",
    "enable f16;\nconst x = 1;",
    "@group(0)@binding(1)var<uniform> u:mat4x4<f32>;",
    "struct S{x:f32,y:vec2<f32>}",
    "alias Arr=array<vec2<f32>,4>;",
    "override block_size:u32;",
    "const_assert  1<2;",
    "fn f(v:f32)->f32{if v<0.0 {return 0.0;} else if v>1.0 {return 1.0;} else {return v;}}",
    "fn f(){for(var i=0;i<4;i++){g(i);}for(;;){break;}}",
    "fn f(x:bool){while x {discard;}}",
    "fn f(i:i32){switch i {case 1,2:{h();}default:{}}}",
    "fn f(){var i=0;loop{i++;continuing{i+=2;break if i>10;}}}",
    "fn f(){_=g();var p=&v;let d=*p;}",
    "const m = mat4x4<f32>(1.0, 0.0, 0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0, 0.0, 1.0);",
    "const y = (a+b)*c - d[2].x;",
];

#[test]
fn formatting_is_idempotent() {
    for source in CASES {
        let once = fmt(source);
        assert_eq!(once, fmt(&once), "not idempotent for {source:?}");
    }
}

#[test]
fn directives_print_one_per_line_before_declarations() {
    let source =
        "enable f16 ;\nrequires readonly_and_readwrite_storage_textures;\ndiagnostic( off , derivative_uniformity );\nconst x = 1;";
    assert_eq!(
        fmt(source),
        "enable f16;\n\
         requires readonly_and_readwrite_storage_textures;\n\
         diagnostic(off, derivative_uniformity);\n\
         \n\
         const x = 1;\n"
    );
}

#[test]
fn globals_are_separated_by_a_blank_line() {
    assert_eq!(
        fmt("const a = 1;const b = 2;"),
        "const a = 1;\n\nconst b = 2;\n"
    );
}

// ── declarations and attributes ─────────────────────────────────────────

#[test]
fn declaration_attributes_go_one_per_line() {
    assert_eq!(
        fmt("@group(0)@binding(1)var<uniform> u:mat4x4<f32>;"),
        "@group(0)\n@binding(1)\nvar<uniform> u: mat4x4<f32>;\n"
    );
}

#[test]
fn function_attributes_go_one_per_line() {
    assert_eq!(
        fmt("@vertex fn main(@location(0)pos:vec4<f32>)->@builtin(position)vec4<f32>{return pos;}"),
        "@vertex\nfn main(@location(0) pos: vec4<f32>) -> @builtin(position) vec4<f32> {\n  return pos;\n}\n"
    );
}

#[test]
fn absent_initializer_emits_no_equals_clause() {
    assert_eq!(fmt("override block_size:u32;"), "override block_size: u32;\n");
    assert_eq!(
        fmt("var<storage,read_write> data:array<f32>;"),
        "var<storage, read_write> data: array<f32>;\n"
    );
}

#[test]
fn struct_members_always_end_in_a_comma() {
    assert_eq!(fmt("struct S{x:f32}"), "struct S {\n  x: f32,\n}\n");
    assert_eq!(
        fmt("struct V{@location(0)position:vec4<f32>,@location(1)uv:vec2<f32>}"),
        "struct V {\n  @location(0) position: vec4<f32>,\n  @location(1) uv: vec2<f32>,\n}\n"
    );
}

#[test]
fn parameters_stay_flat_without_a_trailing_comma() {
    assert_eq!(fmt("fn f(a: f32, b: f32) {}"), "fn f(a: f32, b: f32) {}\n");
}

#[test]
fn parameters_wrap_with_a_trailing_comma_when_too_wide() {
    let source = "fn f(first_parameter: f32, second_parameter: f32) -> f32 { return first_parameter; }";
    assert_eq!(
        fmt_width(source, 40),
        "fn f(\n\
         \x20 first_parameter: f32,\n\
         \x20 second_parameter: f32,\n\
         ) -> f32 {\n\
         \x20 return first_parameter;\n\
         }\n"
    );
}

// ── control flow ────────────────────────────────────────────────────────

#[test]
fn else_if_chains_stay_flat() {
    assert_eq!(
        fmt("fn f(v:f32)->f32{if v<0.0 {return 0.0;} else if v>1.0 {return 1.0;} else {return v;}}"),
        "fn f(v: f32) -> f32 {\n\
         \x20 if (v < 0.0) {\n\
         \x20   return 0.0;\n\
         \x20 } else if (v > 1.0) {\n\
         \x20   return 1.0;\n\
         \x20 } else {\n\
         \x20   return v;\n\
         \x20 }\n\
         }\n"
    );
}

#[test]
fn empty_bodies_render_as_two_characters() {
    assert_eq!(
        fmt("fn f(x: bool) { if x {} while x {} }"),
        "fn f(x: bool) {\n  if (x) {}\n  while (x) {}\n}\n"
    );
}

#[test]
fn for_headers_supply_their_own_semicolons() {
    assert_eq!(
        fmt("fn f(){for(var i=0;i<4;i++){g(i);}}"),
        "fn f() {\n  for (var i = 0; i < 4; i++) {\n    g(i);\n  }\n}\n"
    );
    assert_eq!(
        fmt("fn f(){for(;;){break;}}"),
        "fn f() {\n  for (;;) {\n    break;\n  }\n}\n"
    );
}

#[test]
fn case_selectors_share_one_case_keyword() {
    assert_eq!(
        fmt("fn f(i:i32){switch i {case 1,2,3:{h();}default:{}}}"),
        "fn f(i: i32) {\n\
         \x20 switch (i) {\n\
         \x20   case 1, 2, 3: {\n\
         \x20     h();\n\
         \x20   }\n\
         \x20   default: {}\n\
         \x20 }\n\
         }\n"
    );
}

#[test]
fn loop_with_continuing_and_break_if() {
    assert_eq!(
        fmt("fn f(){var i=0;loop{i++;continuing{i+=2;break if i>10;}}}"),
        "fn f() {\n\
         \x20 var i = 0;\n\
         \x20 loop {\n\
         \x20   i++;\n\
         \x20   continuing {\n\
         \x20     i += 2;\n\
         \x20     break if i > 10;\n\
         \x20   }\n\
         \x20 }\n\
         }\n"
    );
}

// ── expressions ─────────────────────────────────────────────────────────

#[test]
fn parentheses_follow_the_tree() {
    assert_eq!(fmt("const y = (a+b)*c;"), "const y = (a + b) * c;\n");
    assert_eq!(fmt("const z = a+b*c;"), "const z = a + b * c;\n");
}

#[test]
fn postfix_chains_recurse() {
    assert_eq!(fmt("const x = -a.b[1].c;"), "const x = -a.b[1].c;\n");
}

#[test]
fn phony_assignment_keeps_the_underscore() {
    assert_eq!(fmt("fn f(){_=g();}"), "fn f() {\n  _ = g();\n}\n");
}

// ── float normalization ─────────────────────────────────────────────────

#[test]
fn float_literals_gain_a_missing_fractional_part() {
    assert_eq!(fmt("const x: f32 = 0;"), "const x: f32 = 0.0;\n");
    assert_eq!(fmt("const s = 1f;"), "const s = 1.0f;\n");
    assert_eq!(fmt("const b = bitcast<u32>(1f);"), "const b = bitcast<u32>(1.0f);\n");
}

#[test]
fn float_literals_with_point_or_exponent_pass_through() {
    assert_eq!(fmt("const y = 1.5;"), "const y = 1.5;\n");
    assert_eq!(fmt("const e = 1e3;"), "const e = 1e3;\n");
    assert_eq!(fmt("const h = 0x1p2;"), "const h = 0x1p2;\n");
}

#[test]
fn integer_literals_are_never_touched() {
    assert_eq!(fmt("const i = 1;"), "const i = 1;\n");
    assert_eq!(fmt("const u: u32 = 1;"), "const u: u32 = 1;\n");
}

// ── matrix row grouping ─────────────────────────────────────────────────

#[test]
fn matrix_constructor_uses_row_layout() {
    let source = "const m = mat4x4<f32>(1.0, 0.0, 0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0, 0.0, 1.0);";
    assert_eq!(
        fmt(source),
        "const m = mat4x4<f32>(\n\
         \x20 1.0, 0.0, 0.0, 0.0,\n\
         \x20 0.0, 1.0, 0.0, 0.0,\n\
         \x20 0.0, 0.0, 1.0, 0.0,\n\
         \x20 0.0, 0.0, 0.0, 1.0,\n\
         );\n"
    );
}

#[test]
fn row_layout_wins_even_when_flat_would_fit() {
    assert_eq!(
        fmt("const m = mat2x2<f32>(1.0, -2.0, 3.0, 4.0);"),
        "const m = mat2x2<f32>(\n  1.0, -2.0,\n  3.0, 4.0,\n);\n"
    );
}

#[test]
fn rectangular_matrices_group_by_column_count() {
    assert_eq!(
        fmt("const m = mat2x3<f32>(1.0, 2.0, 3.0, 4.0, 5.0, 6.0);"),
        "const m = mat2x3<f32>(\n  1.0, 2.0,\n  3.0, 4.0,\n  5.0, 6.0,\n);\n"
    );
}

#[test]
fn identifier_argument_defeats_the_row_heuristic() {
    let source = "const m = mat4x4<f32>(x, 1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0, 8.0, 9.0, 10.0, 11.0, 12.0, 13.0, 14.0, 15.0);";
    assert_eq!(
        fmt(source),
        "const m = mat4x4<f32>(\n\
         \x20 x,\n\
         \x20 1.0,\n\
         \x20 2.0,\n\
         \x20 3.0,\n\
         \x20 4.0,\n\
         \x20 5.0,\n\
         \x20 6.0,\n\
         \x20 7.0,\n\
         \x20 8.0,\n\
         \x20 9.0,\n\
         \x20 10.0,\n\
         \x20 11.0,\n\
         \x20 12.0,\n\
         \x20 13.0,\n\
         \x20 14.0,\n\
         \x20 15.0,\n\
         );\n"
    );
}

#[test]
fn short_non_matrix_calls_stay_flat() {
    assert_eq!(
        fmt("const v = vec3<f32>(1.0, 2.0, 3.0);"),
        "const v = vec3<f32>(1.0, 2.0, 3.0);\n"
    );
    assert_eq!(
        fmt("const m = mat2x2<f32>(a, b, c, d);"),
        "const m = mat2x2<f32>(a, b, c, d);\n"
    );
}

// ── verbatim fallback ───────────────────────────────────────────────────

#[test]
fn const_assert_passes_through_byte_for_byte() {
    assert_eq!(fmt("const_assert  1<2;"), "const_assert  1<2;\n");
    assert_eq!(
        fmt("fn f(){const_assert 1<2;}"),
        "fn f() {\n  const_assert 1<2;\n}\n"
    );
}

// ── embedded snippets ───────────────────────────────────────────────────

#[test]
fn tagged_template_round_trip() {
    assert_eq!(
        fmt_host("const shader = wgsl`var x:f32=1.0;`;"),
        "const shader = wgsl`var x: f32 = 1.0;`;"
    );
}

#[test]
fn untagged_template_without_pragma_is_untouched() {
    let host = "const shader = `var x:f32=1.0;`;";
    assert_eq!(fmt_host(host), host);
}

#[test]
fn pragma_comment_applies_to_the_whole_file() {
    let host = "/* wgsl */\nconst a = `var x:f32=1.0;`;\nconst b = `let y:i32=2;`;";
    assert_eq!(
        fmt_host(host),
        "/* wgsl */\nconst a = `var x: f32 = 1.0;`;\nconst b = `let y: i32 = 2;`;"
    );
}

#[test]
fn interpolated_template_is_untouched() {
    let host = "const shader = wgsl`var x:f32=${value};`;";
    assert_eq!(fmt_host(host), host);
}

#[test]
fn multi_line_snippets_are_reindented_into_the_literal() {
    let host = "function make() {\n  const shader = wgsl`var x:f32=1.0;fn main(){}`;\n}";
    assert_eq!(
        fmt_host(host),
        "function make() {\n\
         \x20 const shader = wgsl`\n\
         \x20   var x: f32 = 1.0;\n\
         \n\
         \x20   fn main() {}\n\
         \x20 `;\n\
         }"
    );
}

#[test]
fn embedded_formatting_is_idempotent() {
    let host = "function make() {\n  const shader = wgsl`var x:f32=1.0;fn main(){}`;\n}";
    let once = fmt_host(host);
    assert_eq!(once, fmt_host(&once));
}

#[test]
fn invalid_snippet_aborts_the_file() {
    let host = "const shader = wgsl`var x: = ;`;";
    assert!(format_embedded(host, &FormatOptions::default()).is_err());
}

// ── naga cross-check ────────────────────────────────────────────────────

#[test]
fn formatted_output_reparses_with_naga() {
    let source = "@group(0)@binding(0)var<uniform> transform:mat4x4<f32>;\
        struct VertexInput{@location(0)position:vec4<f32>,}\
        @vertex fn vs_main(input:VertexInput)->@builtin(position)vec4<f32>{return transform*input.position;}";
    let formatted = fmt(source);
    naga::front::wgsl::parse_str(&formatted).expect("naga rejected formatted output");
}
