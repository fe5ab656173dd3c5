use crate::{
    catalog::SqlType,
    functions::{FunctionCall, FunctionHandler, TypedExpression},
    graph::{AggregateFunction, Expression},
    translator::TranslationError,
};

pub struct AggregateFunctionHandler;

impl AggregateFunctionHandler {
    fn function(name: &str) -> Option<AggregateFunction> {
        match name {
            "COUNT" => Some(AggregateFunction::Count),
            "SUM" => Some(AggregateFunction::Sum),
            "AVG" => Some(AggregateFunction::Avg),
            "MIN" => Some(AggregateFunction::Min),
            "MAX" => Some(AggregateFunction::Max),
            _ => None,
        }
    }

    fn mismatch(call: &FunctionCall, expected: &str) -> TranslationError {
        let got = call.args.iter().map(|a| a.sql_type.to_string()).collect::<Vec<_>>().join(", ");
        TranslationError::unsupported(format!("{} expects {}, got ({})", call.name, expected, got))
    }
}

impl FunctionHandler for AggregateFunctionHandler {
    fn name(&self) -> &'static str { "aggregate" }

    fn functions(&self) -> &'static [&'static str] {
        &["AVG", "COUNT", "MAX", "MIN", "SUM"]
    }

    fn is_aggregate(&self) -> bool { true }

    fn bind(&self, call: &FunctionCall) -> Result<Option<TypedExpression>, TranslationError> {
        let Some(function) = Self::function(&call.name) else {
            return Ok(None);
        };

        if call.star {
            // only COUNT(*) takes a star
            if function != AggregateFunction::Count || call.distinct {
                return Err(Self::mismatch(call, "an argument"));
            }
            return Ok(Some(TypedExpression::new(
                Expression::Aggregate { function, distinct: false, arg: None },
                SqlType::BigInt,
                false,
            )));
        }

        let [arg] = call.args.as_slice() else {
            return Err(Self::mismatch(call, "exactly one argument"));
        };
        if arg.expression.contains_aggregate() {
            return TranslationError::unsupported(format!("nested aggregate inside {}", call.name)).err();
        }

        let (sql_type, nullable) = match function {
            AggregateFunction::Count => (SqlType::BigInt, false),
            AggregateFunction::Sum if arg.sql_type.is_integral() => (SqlType::BigInt, true),
            AggregateFunction::Sum | AggregateFunction::Avg if arg.sql_type.is_numeric() => {
                (SqlType::promote(arg.sql_type, SqlType::Decimal), true)
            }
            AggregateFunction::Sum | AggregateFunction::Avg => return Err(Self::mismatch(call, "a numeric argument")),
            AggregateFunction::Min | AggregateFunction::Max => (arg.sql_type, true),
        };

        Ok(Some(TypedExpression::new(
            Expression::Aggregate { function, distinct: call.distinct, arg: Some(Box::new(arg.expression.clone())) },
            sql_type,
            nullable,
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::Variable;

    fn arg(sql_type: SqlType) -> TypedExpression {
        TypedExpression::new(Expression::var(&Variable::new("x")), sql_type, true)
    }

    fn bound(call: &FunctionCall) -> TypedExpression {
        AggregateFunctionHandler.bind(call).unwrap().expect("handler should accept the call")
    }

    #[test]
    fn count_star_and_distinct() {
        let mut star = FunctionCall::new("count", vec![]);
        star.star = true;
        let counted = bound(&star);
        assert_eq!(counted.expression.to_string(), "COUNT(*)");
        assert_eq!((counted.sql_type, counted.nullable), (SqlType::BigInt, false));

        let mut distinct = FunctionCall::new("count", vec![arg(SqlType::Varchar)]);
        distinct.distinct = true;
        assert_eq!(bound(&distinct).expression.to_string(), "COUNT(DISTINCT ?x)");

        let mut sum_star = FunctionCall::new("sum", vec![]);
        sum_star.star = true;
        assert!(AggregateFunctionHandler.bind(&sum_star).is_err());
    }

    #[test]
    fn result_types_follow_the_argument() {
        let typed = |name: &str, t: SqlType| bound(&FunctionCall::new(name, vec![arg(t)]));
        assert_eq!(typed("sum", SqlType::Integer).sql_type, SqlType::BigInt);
        assert_eq!(typed("sum", SqlType::Double).sql_type, SqlType::Double);
        assert_eq!(typed("avg", SqlType::Integer).sql_type, SqlType::Decimal);
        assert_eq!(typed("min", SqlType::Varchar).sql_type, SqlType::Varchar);
        assert!(AggregateFunctionHandler.bind(&FunctionCall::new("sum", vec![arg(SqlType::Varchar)])).is_err());
        assert!(typed("max", SqlType::Date).nullable);
    }

    #[test]
    fn aggregates_do_not_nest() {
        let inner = bound(&FunctionCall::new("max", vec![arg(SqlType::Integer)]));
        assert!(AggregateFunctionHandler.bind(&FunctionCall::new("sum", vec![inner])).is_err());
    }

    #[test]
    fn other_names_are_declined() {
        assert!(AggregateFunctionHandler.bind(&FunctionCall::new("upper", vec![arg(SqlType::Varchar)])).unwrap().is_none());
    }
}
