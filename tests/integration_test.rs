// Integration tests for the C to VHDL translator

use cvhdl::codegen::annotate::collect_calls;
use cvhdl::codegen::{annotate_func_calls, build_gen_name, generate_vhdl, GeneratorOptions};
use cvhdl::driver::{self, TranslateError};
use cvhdl::parser::ast::{Program, SourceLocation};
use cvhdl::parser::lexer::{Keyword, Token};
use cvhdl::parser::{ParseError, Parser};

fn parse(source: &str) -> Result<Program, ParseError> {
    Parser::new(source)?.parse_program()
}

fn translate(source: &str) -> String {
    driver::translate(source, &GeneratorOptions::default()).expect("Translation failed")
}

/// Lines between `entity <name> is` and the matching `end entity;`
fn entity_block<'a>(vhdl: &'a str, name: &str) -> Vec<&'a str> {
    let header = format!("entity {} is", name);
    vhdl.lines()
        .skip_while(|line| *line != header)
        .take_while(|line| *line != "end entity;")
        .collect()
}

fn port_count(vhdl: &str, name: &str) -> usize {
    entity_block(vhdl, name)
        .iter()
        .filter(|line| line.contains(" : in ") || line.contains(" : out "))
        .count()
}

#[test]
fn test_add_end_to_end() {
    let source = "int add(int a, int b) { return a + b; }";

    let vhdl = translate(source);

    assert!(vhdl.contains("entity add is"));
    assert!(vhdl.contains("    a : in std_logic_vector(31 downto 0);\n"));
    assert!(vhdl.contains("    b : in std_logic_vector(31 downto 0);\n"));
    assert!(vhdl.contains("    result : out std_logic_vector(31 downto 0)\n"));
    assert!(vhdl.contains("architecture behavioral of add is"));

    let clocked = vhdl.find("elsif rising_edge(clk) then").expect("no clocked branch");
    let assign = vhdl.find("      result <= a + b;").expect("no result assignment");
    let end = vhdl.find("    end if;").expect("no end of clocked branch");
    assert!(clocked < assign && assign < end);
}

#[test]
fn test_port_count_matches_parameters() {
    let source = r#"
        int none() { return 1; }
        int one(int a) { return a; }
        char three(char x, int y, double z) { return x; }
        void nothing(float f) { }
    "#;

    let vhdl = translate(source);

    assert_eq!(port_count(&vhdl, "none"), 3);
    assert_eq!(port_count(&vhdl, "one"), 4);
    assert_eq!(port_count(&vhdl, "three"), 6);
    assert_eq!(port_count(&vhdl, "nothing"), 4);
    assert_eq!(vhdl.matches("end entity;").count(), 4);
    assert_eq!(vhdl.matches("end architecture;").count(), 4);

    let three = entity_block(&vhdl, "three").join("\n");
    assert!(three.contains("x : in std_logic_vector(7 downto 0);"));
    assert!(three.contains("z : in std_logic_vector(63 downto 0);"));
    assert!(three.contains("result : out std_logic_vector(7 downto 0)"));
}

#[test]
fn test_generated_name_rule() {
    assert_eq!(build_gen_name("x", 0), "x_v");
    assert_eq!(build_gen_name("x", 1), "x_v1");
    assert_eq!(build_gen_name("foo_v", 0), "foo_v0");
    assert_eq!(build_gen_name("foo_v1", 0), "foo_v10");

    // distinct ordinals give distinct names
    let names: Vec<String> = (0..5).map(|k| build_gen_name("x", k)).collect();
    for (i, a) in names.iter().enumerate() {
        for b in &names[i + 1..] {
            assert_ne!(a, b);
        }
    }
    // a source name that already looks generated never meets a generated one
    assert_ne!(build_gen_name("x_v", 0), build_gen_name("x", 1));
}

#[test]
fn test_shadowed_local_gets_second_variable() {
    let source = "int f(int n) { int x = 1; if (n) { int x = 2; x = x + 1; } return x; }";

    let vhdl = translate(source);

    assert!(vhdl.contains("    variable x_v : std_logic_vector(31 downto 0);\n"));
    assert!(vhdl.contains("    variable x_v1 : std_logic_vector(31 downto 0);\n"));
    assert!(vhdl.contains("        x_v1 := x_v1 + 1;\n"));
    assert!(vhdl.contains("      result <= x_v;\n"));
    // one signal for both declarations
    assert_eq!(vhdl.matches("  signal x : ").count(), 1);
}

#[test]
fn test_array_bounds_are_checked() {
    let result = parse("int f() { int a[3]; a[3] = 1; return 0; }");
    match result {
        Err(ParseError::ArrayIndexOutOfBounds {
            name, index, size, ..
        }) => {
            assert_eq!(name, "a");
            assert_eq!(index, 3);
            assert_eq!(size, 3);
        }
        other => panic!("expected a bounds error, got {:?}", other),
    }

    assert!(parse("int f() { int a[3]; a[2] = 1; return a[2]; }").is_ok());
    assert!(parse("int f(int i) { int a[3]; a[i] = 1; return a[i + 7]; }").is_ok());
}

#[test]
fn test_out_of_bounds_read_reports_line() {
    let source = "int f() {\n    int a[2];\n    return a[-1];\n}\n";

    let err = driver::translate(source, &GeneratorOptions::default()).unwrap_err();

    assert_eq!(err.line(), Some(3));
    assert_eq!(
        err.to_string(),
        "Error (line 3): Array index -1 out of bounds for 'a' with size 2"
    );
}

#[test]
fn test_loop_control_placement() {
    let outside_break = parse("int f() { break; return 0; }");
    assert!(matches!(
        outside_break,
        Err(ParseError::LoopControlOutsideLoop {
            keyword: "break",
            ..
        })
    ));

    let outside_continue = parse("int f(int n) { if (n) { continue; } return 0; }");
    assert!(matches!(
        outside_continue,
        Err(ParseError::LoopControlOutsideLoop {
            keyword: "continue",
            ..
        })
    ));

    assert!(parse("int f(int n) { while (n) { break; } return 0; }").is_ok());
    assert!(parse("int f(int n) { while (n) { continue; } return 0; }").is_ok());
    assert!(parse("int f(int n) { for (int i = 0; i < n; i++) { if (i) { break; } } return 0; }").is_ok());

    // the depth counter is per function
    assert!(parse("int g(int n) { while (n) { break; } return 0; } int f() { break; }").is_err());
}

#[test]
fn test_call_annotation_unique_and_idempotent() {
    let source = r#"
        int g(int v) { return v; }
        int f(int a) {
            int x = g(a);
            if (a > 0) {
                x = g(x) + g(1);
            }
            return x;
        }
    "#;

    let mut program = parse(source).expect("Parsing failed");
    let func = &mut program.functions[1];

    assert_eq!(annotate_func_calls(func), 3);
    let first: Vec<Option<usize>> = collect_calls(func).iter().map(|c| c.instance).collect();
    assert_eq!(first, vec![Some(0), Some(1), Some(2)]);

    assert_eq!(annotate_func_calls(func), 0);
    let second: Vec<Option<usize>> = collect_calls(func).iter().map(|c| c.instance).collect();
    assert_eq!(first, second);
}

#[test]
fn test_call_instances_are_wired() {
    let source = r#"
        char low(int v) { return v; }
        int f(int a) { return low(a) + low(5); }
    "#;

    let vhdl = translate(source);

    assert!(vhdl.contains("  signal call_low_0_res : std_logic_vector(7 downto 0);\n"));
    assert!(vhdl.contains("  signal call_low_1_res : std_logic_vector(7 downto 0);\n"));
    assert!(vhdl.contains("  u_low_0: entity work.low port map( clk, reset, a, call_low_0_res );\n"));
    assert!(vhdl.contains(
        "  u_low_1: entity work.low port map( clk, reset, std_logic_vector(to_unsigned(5, 32)), call_low_1_res );\n"
    ));
    assert!(vhdl.contains("      result <= call_low_0_res + call_low_1_res;\n"));
}

#[test]
fn test_condition_lowering() {
    let source = r#"
        int f(int a, int b, int c) {
            if (a == b) { return 1; }
            if (a + b) { return 2; }
            if (a == b && c) { return 3; }
            return 0;
        }
    "#;

    let vhdl = translate(source);

    assert!(vhdl.contains("      if unsigned(a) = unsigned(b) then\n"));
    assert!(vhdl.contains("      if unsigned(a + b) /= 0 then\n"));
    assert!(vhdl.contains("      if ((unsigned(a) = unsigned(b)) and unsigned(c) /= 0) then\n"));
    assert!(!vhdl.contains("unsigned(unsigned(a) = unsigned(b)) /= 0"));
}

#[test]
fn test_for_loop_end_to_end() {
    let source = r#"
        int sum_to(int n) {
            int sum = 0;
            for (int i = 0; i < n; i++) {
                sum = sum + i;
            }
            return sum;
        }
    "#;

    let vhdl = translate(source);

    let expected = "      sum_v := 0;
      i_v := 0;
      while unsigned(i_v) < unsigned(n) loop
        sum_v := sum_v + i_v;
        i_v := i_v + 1;
      end loop;
      result <= sum_v;
";
    assert!(vhdl.contains(expected), "{}", vhdl);
    assert!(vhdl.contains("  signal sum : std_logic_vector(31 downto 0);\n"));
    assert!(vhdl.contains("  signal i : std_logic_vector(31 downto 0);\n"));
    assert!(!vhdl.contains("unsigned(i_v) < unsigned(n)) /= 0"));
}

#[test]
fn test_array_initializer_constant() {
    let source = "int f(int i) { int t[4] = {1, -1}; return t[i]; }";

    let vhdl = translate(source);

    assert!(vhdl.contains("  type t_type is array (0 to 3) of std_logic_vector(31 downto 0);\n"));
    assert!(vhdl.contains("  -- Array initialization\n"));
    assert!(vhdl.contains(
        "  constant t_init : t_type := (\"00000000000000000000000000000001\", \"11111111111111111111111111111111\", others => (others => '0'));\n"
    ));
    assert!(vhdl.contains("  signal t : t_type := t_init;\n"));
    assert!(vhdl.contains("      result <= t(to_integer(unsigned(i)));\n"));
}

#[test]
fn test_skipped_constructs_do_not_stop_translation() {
    let source = r#"
        int counter;
        int f(int a) {
            a += 1;
            print(a);
            return a;
        }
    "#;

    let vhdl = translate(source);

    assert!(vhdl.contains("entity f is"));
    assert!(!vhdl.contains("counter"));
    assert!(vhdl.contains("      result <= a;\n"));
}

#[test]
fn test_syntax_error_is_fatal() {
    let err = driver::translate("int f(int a) { return a + ; }", &GeneratorOptions::default())
        .unwrap_err();
    assert!(matches!(err, TranslateError::Parse(ParseError::Syntax { .. })));
    assert!(err.to_string().starts_with("Error (line 1): "));
}

#[test]
fn test_generate_into_writer() {
    let program = parse("int id(int v) { return v; }").expect("Parsing failed");
    let options = GeneratorOptions {
        preamble_per_entity: true,
    };

    let mut out = Vec::new();
    generate_vhdl(&program, &mut out, &options).expect("Generation failed");
    let vhdl = String::from_utf8(out).expect("VHDL is not UTF-8");

    assert!(vhdl.starts_with("-- VHDL generated by cvhdl\n"));
    let library = vhdl.find("library IEEE;").unwrap();
    let entity = vhdl.find("-- Function: id").unwrap();
    assert!(library < entity);
}

#[test]
fn test_sample_program() {
    let source = include_str!("../demos/sample.c");

    let vhdl = translate(source);

    for name in [
        "square",
        "sum_of_squares",
        "clamp",
        "table_lookup",
        "first_over",
        "sum_odd",
        "to_upper",
    ] {
        assert!(vhdl.contains(&format!("entity {} is", name)), "missing {}", name);
    }

    assert!(vhdl.contains("u_square_0: entity work.square port map( clk, reset, a, call_square_0_res );"));
    assert!(vhdl.contains("u_square_1: entity work.square port map( clk, reset, b, call_square_1_res );"));
    assert!(vhdl.contains("      elsif unsigned(v) > unsigned(hi) then\n"));
    assert!(vhdl.contains("      while true loop\n"));
    assert!(vhdl.contains("          exit;\n"));
    assert!(vhdl.contains("          i_v := i_v + 1;\n          next;\n"));
    assert!(vhdl.contains("unsigned(c) >= to_unsigned(97, 32)"));
    assert!(vhdl.contains("  -- note: array table kept as signal (not variableized)\n"));
}

#[test]
fn test_ast_dump() {
    let program = driver::parse_source("int add(int a, int b) { return a + b; }")
        .expect("Parsing failed");
    let dump = program.to_string();

    assert!(dump.contains("Function int add(int a, int b)"));
    assert!(dump.contains("Return (a + b)"));
}

#[test]
fn test_token_stream_without_positions() {
    // every token reports the same location
    let at = SourceLocation::new(1, 0);
    let mut tokens = vec![
        Token::Keyword(Keyword::Int, at),
        Token::Ident("f".to_string(), at),
        Token::LParen(at),
        Token::RParen(at),
        Token::LBrace(at),
    ];
    for (name, value) in [("x", "1"), ("y", "2")] {
        tokens.extend([
            Token::Keyword(Keyword::Int, at),
            Token::Ident(name.to_string(), at),
            Token::Operator("=", at),
            Token::Number(value.to_string(), at),
            Token::Semicolon(at),
        ]);
    }
    tokens.extend([
        Token::Keyword(Keyword::Return, at),
        Token::Ident("x".to_string(), at),
        Token::Semicolon(at),
        Token::RBrace(at),
    ]);

    let program = Parser::from_tokens(tokens)
        .parse_program()
        .expect("Parsing failed");
    let mut out = Vec::new();
    generate_vhdl(&program, &mut out, &GeneratorOptions::default()).expect("Generation failed");
    let vhdl = String::from_utf8(out).expect("VHDL is not UTF-8");

    assert!(vhdl.contains("      x_v := 1;\n"), "{}", vhdl);
    assert!(vhdl.contains("      y_v := 2;\n"), "{}", vhdl);
    assert!(vhdl.contains("      result <= x_v;\n"), "{}", vhdl);
}

#[test]
fn test_conflicting_array_declarations_are_rejected() {
    let source = r#"
        int f(int n) {
            if (n) { int a[2]; a[1] = 1; }
            else { int a[4]; a[3] = 1; }
            return 0;
        }
    "#;

    let err = driver::translate(source, &GeneratorOptions::default()).unwrap_err();
    assert!(matches!(err, TranslateError::Parse(ParseError::Syntax { .. })));
    assert_eq!(err.line(), Some(4));

    let same_size = r#"
        int f(int n) {
            if (n) { int a[2]; a[1] = 1; }
            else { int a[2]; a[0] = n; }
            return 0;
        }
    "#;
    let vhdl = translate(same_size);
    assert_eq!(vhdl.matches("type a_type is array").count(), 1);
    assert_eq!(vhdl.matches("-- note: array a kept as signal").count(), 1);
}

#[test]
fn test_result_local_does_not_read_output_port() {
    let source = "int f(int n) { int result = n; result = result + 1; return result; }";

    let vhdl = translate(source);

    assert!(vhdl.contains("  signal internal_result : std_logic_vector(31 downto 0);\n"));
    assert!(vhdl.contains("begin\n  result <= internal_result;\n"));
    assert!(vhdl.contains("      internal_result <= internal_result + 1;\n"));
    assert!(!vhdl.contains("result <= result"));
}
