//! Classic solver walk-throughs driven through the safe bindings.

use z3_bridge::{Config, Context, LBool, SolverError, SymbolName};

#[test]
fn de_morgan_is_valid() -> Result<(), SolverError> {
    let config = Config::new()?;
    let ctx = Context::new(&config)?;
    drop(config);

    let b = ctx.bool_sort()?;
    let x = ctx.constant(&ctx.symbol("x")?, &b)?;
    let y = ctx.constant(&ctx.symbol("y")?, &b)?;

    // !(x && y) <-> (!x || !y)
    let lhs = x.and(&[&y])?.not()?;
    let rhs = x.not()?.or(&[&y.not()?])?;
    let negated = lhs.iff(&rhs)?.not()?;

    let solver = ctx.solver()?;
    solver.assert(&negated)?;
    assert_eq!(solver.check()?, LBool::False);
    Ok(())
}

#[test]
fn incremental_model_search() -> Result<(), SolverError> {
    let ctx = Context::new(&Config::new()?.with_param("model", "true")?)?;
    let int = ctx.int_sort()?;
    let x = ctx.constant(&ctx.symbol("x")?, &int)?;
    let y = ctx.constant(&ctx.symbol("y")?, &int)?;
    // Constants named by integer symbols, not numerals.
    let one_sym = ctx.symbol_int(1)?;
    assert_eq!(one_sym.name()?, SymbolName::Int(1));
    let v1 = ctx.constant(&one_sym, &int)?;
    let v2 = ctx.constant(&ctx.symbol_int(2)?, &int)?;

    let c1 = x.lt(&y.add(&[&v1])?)?;
    let c2 = x.gt(&v2)?;
    let solver = ctx.solver()?;
    solver.assert(&c1)?;
    solver.assert(&c2)?;
    assert_eq!(solver.check()?, LBool::True);

    let model = solver.model()?;
    let t = ctx.bool_val(true)?.to_string();
    assert_eq!(model.eval(&c1, true)?.map(|v| v.to_string()), Some(t.clone()));
    assert_eq!(model.eval(&c2, true)?.map(|v| v.to_string()), Some(t.clone()));
    drop(model);

    let c3 = x.eq(&y)?.not()?;
    solver.assert(&c3)?;
    assert_eq!(solver.check()?, LBool::True);
    let model = solver.model()?;
    let assigned = model.assignments()?;
    assert!(assigned.contains_key("x"));
    assert!(assigned.contains_key("y"));
    assert_ne!(assigned["x"].as_i64()?, assigned["y"].as_i64()?);
    assert_eq!(model.eval(&c3, true)?.map(|v| v.to_string()), Some(t));
    Ok(())
}

#[test]
fn model_lookup_by_name() -> Result<(), SolverError> {
    let ctx = Context::with_default_config()?;
    let int = ctx.int_sort()?;
    let x = ctx.constant(&ctx.symbol("x")?, &int)?;
    let goal = x.add(&[&ctx.int(4, &int)?])?.eq(&ctx.int(16, &int)?)?;
    assert_eq!(goal.to_string(), "(= (+ x 4) 16)");

    let solver = ctx.solver()?;
    solver.assert(&goal)?;
    assert_eq!(solver.check()?, LBool::True);

    let model = solver.model()?;
    assert_eq!(model.assignments()?["x"].as_i64()?, 12);
    assert_eq!(model.eval(&x, false)?.map(|v| v.as_i64()).transpose()?, Some(12));
    assert!(model.to_string().contains("x"));
    Ok(())
}

#[test]
fn model_of_unsat_check_is_a_native_error() -> Result<(), SolverError> {
    let ctx = Context::with_default_config()?;
    let f = ctx.bool_val(false)?;
    let solver = ctx.solver()?;
    solver.assert(&f)?;
    assert_eq!(solver.check()?, LBool::False);
    let err = solver.model().unwrap_err();
    assert_eq!(err.native().map(|e| e.context), Some(ctx.id()));
    Ok(())
}

#[test]
fn arithmetic_rendering() -> Result<(), SolverError> {
    let ctx = Context::with_default_config()?;
    let int = ctx.int_sort()?;
    let x = ctx.constant(&ctx.symbol("x")?, &int)?;
    let y = ctx.constant(&ctx.symbol("y")?, &int)?;
    assert_eq!(x.sub(&[&y])?.to_string(), "(- x y)");
    assert_eq!(x.mul(&[&y])?.to_string(), "(* x y)");
    assert_eq!(x.gt(&y)?.to_string(), "(> x y)");
    assert_eq!(x.le(&y)?.to_string(), "(<= x y)");
    assert_eq!(x.lt(&y)?.to_string(), "(< x y)");
    assert_eq!(x.distinct(&[&y])?.to_string(), "(distinct x y)");
    assert_eq!(x.decl_name()?.to_string(), "x");
    Ok(())
}
