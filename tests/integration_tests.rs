use pascc::compile;

fn compile_ok(source: &str) -> String {
    match compile(source) {
        Ok(module) => module,
        Err(err) => panic!("expected successful compilation, got: {:?}", err.diagnostics),
    }
}

fn compile_err(source: &str) -> Vec<String> {
    match compile(source) {
        Ok(_) => panic!("expected compilation errors"),
        Err(err) => err.diagnostics.into_iter().map(|d| d.msg).collect(),
    }
}

#[test]
fn module_skeleton() {
    let module = compile_ok("program p; begin writeln end");
    assert!(module.starts_with("(module\n"));
    assert!(module.contains("(import \"P0lib\" \"write\" (func $write (param i32)))"));
    assert!(module.contains("(import \"P0lib\" \"writeln\" (func $writeln))"));
    assert!(module.contains("(import \"P0lib\" \"read\" (func $read (result i32)))"));
    assert!(module.contains("(memory 1)"));
    assert!(module.contains("(start $program)"));
    assert!(module.contains("call $writeln"));
}

#[test]
fn constant_expressions_fold_to_a_single_store() {
    let module = compile_ok(
        "program p;
         var x: integer;
         begin x := 2 + 3 * 4 end",
    );
    assert!(module.contains("i32.const 14"));
    assert!(module.contains("global.set $x"));
    assert!(!module.contains("i32.add"));
    assert!(!module.contains("i32.mul"));
}

#[test]
fn boolean_constants_fold_truth_table_wise() {
    let module = compile_ok(
        "program p;
         var b: boolean;
         begin b := true and not false or false end",
    );
    assert!(module.contains("i32.const 1"));
    assert!(!module.contains("if (result i32)"));
    assert!(!module.contains("i32.eqz"));
}

#[test]
fn folded_division_by_zero_is_reported() {
    let msgs = compile_err(
        "program p;
         var x: integer;
         begin x := 1 div 0 end",
    );
    assert!(msgs.iter().any(|m| m == "division by zero"));
}

#[test]
fn oversized_numeral_is_reported() {
    let msgs = compile_err(
        "program p;
         const c = 2147483648;
         begin writeln end",
    );
    assert!(msgs.iter().any(|m| m == "number too large"));
}

#[test]
fn shadowing_resolves_to_the_local_inside_the_procedure() {
    let module = compile_ok(
        "program p;
         var x: integer;
         procedure q;
           var x: integer;
           begin x := 1 end;
         begin x := 2 end",
    );
    let func_q = module
        .split("(func $q")
        .nth(1)
        .and_then(|rest| rest.split("(func ").next())
        .unwrap();
    assert!(func_q.contains("local.set $x"));
    assert!(!func_q.contains("global.set $x"));
    let func_program = module.split("(func $program").nth(1).unwrap();
    assert!(func_program.contains("global.set $x"));
}

#[test]
fn redeclaration_in_the_same_scope_is_rejected() {
    let msgs = compile_err(
        "program p;
         var x: integer;
         var x: integer;
         begin x := 1 end",
    );
    assert!(msgs.iter().any(|m| m == "multiple definition"));
}

#[test]
fn undefined_identifier_is_reported_once() {
    let msgs = compile_err(
        "program p;
         begin y := 1 end",
    );
    assert_eq!(msgs, vec!["undefined identifier".to_string()]);
}

#[test]
fn counting_loop_materializes_the_ascending_range() {
    let module = compile_ok(
        "program p;
         begin for i := 3 to 8 do write(i) end",
    );
    assert_eq!(materialized_values(&module), vec![3, 4, 5, 6, 7, 8]);
    assert!(module.contains("call $write"));
    assert!(module.contains("i32.lt_s"));
}

#[test]
fn counting_loop_materializes_the_descending_range() {
    let module = compile_ok(
        "program p;
         begin for i := 8 downto 6 do write(i) end",
    );
    assert_eq!(materialized_values(&module), vec![8, 7, 6]);
}

#[test]
fn contradictory_constant_bounds_are_rejected() {
    let msgs = compile_err("program p; begin for i := 3 to 1 do write(i) end");
    assert!(msgs.iter().any(|m| m == "empty for range"));
    let msgs = compile_err("program p; begin for i := 8 downto 10 do write(i) end");
    assert!(msgs.iter().any(|m| m == "empty for range"));
}

#[test]
fn value_list_loop_keeps_written_order_and_duplicates() {
    let module = compile_ok(
        "program p;
         begin for x in [1, 3, 5, 7, 5, 2] do write(x) end",
    );
    assert_eq!(materialized_values(&module), vec![1, 3, 5, 7, 5, 2]);
}

#[test]
fn loop_control_variable_is_invisible_outside_the_loop() {
    let msgs = compile_err(
        "program p;
         var y: integer;
         begin
           for i := 1 to 3 do write(i);
           y := i
         end",
    );
    assert!(msgs.iter().any(|m| m == "undefined identifier"));
}

#[test]
fn case_lowering_captures_selector_and_guards_arms() {
    let module = compile_ok(
        "program p;
         var x: integer;
         begin
           x := 7;
           case x of
             3, 5: write(x);
             2, 4: write(x)
           else write(x + 2)
           end
         end",
    );
    assert!(module.contains("local.set $case.1"));
    assert!(module.contains("$matched."));
    assert!(module.contains("i32.eq"));
    // the else arm runs only when nothing matched
    assert!(module.contains("i32.eqz"));
}

#[test]
fn out_of_bounds_constant_index_is_reported_on_read_and_write() {
    let msgs = compile_err(
        "program p;
         var a: array [1 .. 10] of integer;
         var x: integer;
         begin x := a[0] end",
    );
    assert!(msgs.iter().any(|m| m == "index out of bounds"));
    let msgs = compile_err(
        "program p;
         var a: array [1 .. 10] of integer;
         begin a[11] := 1 end",
    );
    assert!(msgs.iter().any(|m| m == "index out of bounds"));
}

#[test]
fn runtime_index_rebases_and_scales() {
    let module = compile_ok(
        "program p;
         var a: array [1 .. 10] of integer;
         var x, i: integer;
         begin i := 2; x := a[i] end",
    );
    assert!(module.contains("i32.sub"));
    assert!(module.contains("i32.mul"));
    assert!(module.contains("i32.load"));
}

#[test]
fn record_field_access_folds_into_the_address() {
    let module = compile_ok(
        "program p;
         var r: record a, b: integer end;
         var x: integer;
         begin x := r.b end",
    );
    // r sits at address 0, so r.b is a direct load of address 4
    assert!(module.contains("i32.const 4\ni32.load"));
}

#[test]
fn short_circuit_and_opens_a_conditional_block() {
    let module = compile_ok(
        "program p;
         var a, b, x: boolean;
         begin x := a and b end",
    );
    assert!(module.contains("global.get $a\nif (result i32)\nglobal.get $b\nelse\ni32.const 0\nend"));
}

#[test]
fn short_circuit_or_yields_true_without_the_right_operand() {
    let module = compile_ok(
        "program p;
         var a, b, x: boolean;
         begin x := a or b end",
    );
    assert!(module.contains("global.get $a\nif (result i32)\ni32.const 1\nelse\nglobal.get $b\nend"));
}

#[test]
fn while_loop_reevaluates_the_condition() {
    let module = compile_ok(
        "program p;
         var x: integer;
         begin while x > 0 do x := x - 1 end",
    );
    assert!(module.contains("loop\nglobal.get $x\ni32.const 0\ni32.gt_s\nif"));
    assert!(module.contains("br 1\nend\nend"));
}

#[test]
fn composite_reference_parameter_passes_the_address() {
    let module = compile_ok(
        "program p;
         type t = array [1 .. 3] of integer;
         var a: t;
         procedure q(var v: t);
           begin v[1] := 2 end;
         begin q(a) end",
    );
    assert!(module.contains("(func $q (param $v i32)"));
    assert!(module.contains("call $q"));
    // the body stores through the passed address
    let func_q = module.split("(func $q").nth(1).unwrap();
    assert!(func_q.contains("local.get $v"));
    assert!(func_q.contains("i32.store"));
}

#[test]
fn illegal_parameter_modes_are_rejected() {
    let msgs = compile_err(
        "program p;
         procedure q(var x: integer);
           begin writeln end;
         begin q end",
    );
    assert!(msgs
        .iter()
        .any(|m| m == "only array and record reference parameters are supported"));
    let msgs = compile_err(
        "program p;
         type t = array [1 .. 3] of integer;
         procedure q(v: t);
           begin writeln end;
         begin writeln end",
    );
    assert!(msgs
        .iter()
        .any(|m| m == "structured value parameters are not supported"));
}

#[test]
fn arity_mismatches_are_reported() {
    let msgs = compile_err(
        "program p;
         var x: integer;
         procedure q(a, b: integer);
           begin writeln end;
         begin q(x) end",
    );
    assert!(msgs.iter().any(|m| m == "too few parameters"));
    let msgs = compile_err(
        "program p;
         var x: integer;
         procedure q(a: integer);
           begin writeln end;
         begin q(x, x) end",
    );
    assert!(msgs.iter().any(|m| m == "extra parameter"));
}

#[test]
fn nested_procedures_are_rejected() {
    let msgs = compile_err(
        "program p;
         procedure outer;
           procedure inner;
             begin writeln end;
           begin writeln end;
         begin writeln end",
    );
    assert!(msgs.iter().any(|m| m == "no nested procedures"));
}

#[test]
fn local_composites_are_rejected() {
    let msgs = compile_err(
        "program p;
         procedure q;
           var a: array [1 .. 3] of integer;
           begin writeln end;
         begin writeln end",
    );
    assert!(msgs
        .iter()
        .any(|m| m == "local arrays and records are not supported"));
}

#[test]
fn type_mismatches_are_reported() {
    let msgs = compile_err(
        "program p;
         var x: integer;
         var b: boolean;
         begin x := b end",
    );
    assert!(msgs.iter().any(|m| m == "incompatible assignment"));
    let msgs = compile_err(
        "program p;
         var x: integer;
         var b: boolean;
         begin b := x > 0; b := x = b end",
    );
    assert!(msgs.iter().any(|m| m == "incompatible types"));
}

#[test]
fn read_needs_an_integer_variable() {
    let module = compile_ok(
        "program p;
         var x: integer;
         begin read(x); write(x + 1) end",
    );
    assert!(module.contains("call $read\nglobal.set $x"));
    let msgs = compile_err("program p; begin read(5) end");
    assert!(!msgs.is_empty());
}

#[test]
fn lexical_errors_are_reported_with_positions() {
    let err = match compile("program p;\nbegin writeln @ end") {
        Ok(_) => panic!("expected compilation errors"),
        Err(err) => err,
    };
    let d = &err.diagnostics[0];
    assert_eq!(d.msg, "illegal character");
    assert_eq!(d.line, 2);
    assert!(format!("{}", d).starts_with("error: line 2 pos "));
}

#[test]
fn unterminated_comment_is_reported() {
    let msgs = compile_err("program p; begin writeln end { runs off");
    assert!(msgs.iter().any(|m| m == "comment not terminated"));
}

#[test]
fn comments_are_skipped() {
    let module = compile_ok("program p; { entry point } begin { nothing } writeln end");
    assert!(module.contains("call $writeln"));
}

#[test]
fn compilation_is_deterministic() {
    let source = "program p;
         var a: array [1 .. 4] of integer;
         var x: integer;
         procedure q(v: integer);
           begin write(v) end;
         begin
           for i := 1 to 4 do a[i] := i * i;
           x := a[2];
           case x of 4: q(x) else writeln end
         end";
    assert_eq!(compile_ok(source), compile_ok(source));
}

#[test]
fn trailing_semicolon_before_end_is_an_empty_statement() {
    let module = compile_ok(
        "program p;
         var x: integer;
         begin x := 1; write(x); end",
    );
    assert!(module.contains("call $write"));
}

#[test]
fn doubled_semicolons_are_empty_statements() {
    let module = compile_ok("program p; begin ;; writeln; ; end");
    assert!(module.contains("call $writeln"));
}

#[test]
fn case_else_part_accepts_a_statement_list() {
    let module = compile_ok(
        "program p;
         var x: integer;
         begin
           x := 1;
           case x of 1: write(x) else write(1); write(2) end
         end",
    );
    assert_eq!(module.matches("call $write").count(), 3);
}

#[test]
fn oversized_array_bounds_are_rejected() {
    let msgs = compile_err(
        "program p;
         var a: array [0 .. 2147483647] of integer;
         begin writeln end",
    );
    assert_eq!(msgs, ["array too large"]);
}

#[test]
fn multi_label_case_program_compiles() {
    let module = compile_ok(
        "program p;
  var x, y: integer;
  begin
    x := 3;
    case x of 3,5 : begin write(x) end; 2,4 : begin write(x) end else begin write(x+2); end ; end
  end
",
    );
    assert!(module.contains("call $write"));
}

#[test]
fn nested_value_list_loops_compile() {
    let module = compile_ok(
        "program p;
  var x, y: integer;
  begin
    for y in [1, 3, 5] do
        for x in [2, 4, 6] do
            begin write(x + y) end;
      begin writeln() end;
    writeln()
  end
",
    );
    assert!(module.contains("call $writeln"));
    assert_eq!(module.matches("loop").count(), 2);
}

/// Values stored into the materialized sequence cells that precede the
/// first loop in the module text.
fn materialized_values(module: &str) -> Vec<i32> {
    let mut values = vec![];
    let mut prev = "";
    for line in module.lines() {
        if line == "loop" {
            break;
        }
        if line == "i32.store" {
            if let Some(v) = prev.strip_prefix("i32.const ") {
                if let Ok(v) = v.parse() {
                    values.push(v);
                }
            }
        }
        prev = line;
    }
    values
}
