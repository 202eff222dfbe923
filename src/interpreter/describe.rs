//! Source rendering of expressions for step descriptions

use crate::memory::value::number_to_string;
use crate::parser::ast::{Expression, FunctionNode, MemberProperty, UnaryOp};

/// Render an expression back to readable source text
pub fn expr_to_source(expr: &Expression) -> String {
    match expr {
        Expression::Number { value, .. } => number_to_string(*value),
        Expression::String { value, .. } => format!("\"{}\"", value),
        Expression::Boolean { value, .. } => value.to_string(),
        Expression::Null { .. } => "null".to_string(),
        Expression::Identifier { name, .. } => name.clone(),
        Expression::This { .. } => "this".to_string(),
        Expression::Template {
            quasis,
            expressions,
            ..
        } => {
            let mut out = String::from("`");
            for (i, quasi) in quasis.iter().enumerate() {
                out.push_str(quasi);
                if let Some(e) = expressions.get(i) {
                    out.push_str("${");
                    out.push_str(&expr_to_source(e));
                    out.push('}');
                }
            }
            out.push('`');
            out
        }
        Expression::Member {
            object, property, ..
        } => {
            let obj = expr_to_source(object);
            match property {
                MemberProperty::Named(name) => format!("{}.{}", obj, name),
                MemberProperty::Computed(prop) => format!("{}[{}]", obj, expr_to_source(prop)),
            }
        }
        Expression::Binary {
            op, left, right, ..
        } => format!(
            "{} {} {}",
            expr_to_source(left),
            op.symbol(),
            expr_to_source(right)
        ),
        Expression::Logical {
            op, left, right, ..
        } => format!(
            "{} {} {}",
            expr_to_source(left),
            op.symbol(),
            expr_to_source(right)
        ),
        Expression::Unary { op, argument, .. } => match op {
            UnaryOp::Typeof => format!("typeof {}", expr_to_source(argument)),
            _ => format!("{}{}", op.symbol(), expr_to_source(argument)),
        },
        Expression::Update {
            op,
            prefix,
            argument,
            ..
        } => {
            if *prefix {
                format!("{}{}", op.symbol(), expr_to_source(argument))
            } else {
                format!("{}{}", expr_to_source(argument), op.symbol())
            }
        }
        Expression::Call {
            callee, arguments, ..
        } => format!("{}({})", expr_to_source(callee), join_sources(arguments)),
        Expression::New {
            callee, arguments, ..
        } => format!("new {}({})", expr_to_source(callee), join_sources(arguments)),
        Expression::Assign {
            op, target, value, ..
        } => format!(
            "{} {} {}",
            expr_to_source(target),
            op.symbol(),
            expr_to_source(value)
        ),
        Expression::Array { elements, .. } => {
            let parts: Vec<String> = elements
                .iter()
                .map(|e| e.as_ref().map(expr_to_source).unwrap_or_default())
                .collect();
            format!("[{}]", parts.join(", "))
        }
        Expression::Object { properties, .. } => {
            if properties.is_empty() {
                "{}".to_string()
            } else {
                "{...}".to_string()
            }
        }
        Expression::Conditional {
            test,
            consequent,
            alternate,
            ..
        } => format!(
            "{} ? {} : {}",
            expr_to_source(test),
            expr_to_source(consequent),
            expr_to_source(alternate)
        ),
        Expression::Function { function, .. } => function_signature(function),
        Expression::Await { argument, .. } => format!("await {}", expr_to_source(argument)),
    }
}

fn join_sources(exprs: &[Expression]) -> String {
    exprs
        .iter()
        .map(expr_to_source)
        .collect::<Vec<_>>()
        .join(", ")
}

fn function_signature(function: &FunctionNode) -> String {
    let params: Vec<&str> = function.params.iter().map(|p| p.name.as_str()).collect();
    if function.is_arrow {
        format!("({}) => ...", params.join(", "))
    } else {
        format!(
            "function {}({})",
            function.name.as_deref().unwrap_or(""),
            params.join(", ")
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::ast::Statement;
    use crate::parser::parse_code;

    fn source_of(code: &str) -> String {
        let program = parse_code(code).unwrap();
        match &program.body[0] {
            Statement::Expression { expr, .. } => expr_to_source(expr),
            other => panic!("expected expression statement, got {:?}", other),
        }
    }

    #[test]
    fn test_member_and_call() {
        assert_eq!(source_of("arr[i + 1]"), "arr[i + 1]");
        assert_eq!(source_of("obj.list.push('x', 2)"), "obj.list.push(\"x\", 2)");
    }

    #[test]
    fn test_operators() {
        assert_eq!(source_of("a += b * 2"), "a += b * 2");
        assert_eq!(source_of("i++"), "i++");
        assert_eq!(source_of("--i"), "--i");
        assert_eq!(source_of("typeof x"), "typeof x");
        assert_eq!(source_of("!done"), "!done");
        assert_eq!(source_of("a ? 1 : [2, 3]"), "a ? 1 : [2, 3]");
    }

    #[test]
    fn test_functions() {
        assert_eq!(source_of("(a, b) => a + b"), "(a, b) => ...");
    }
}
