//! Argument synthesis

use crate::error::Violation;
use crate::provider::ArgumentProvider;
use tether_domain::{OperationDescriptor, Value};

/// Build one argument per parameter of `operation`
///
/// Each parameter takes the provider's value if it supplies one, otherwise
/// the type's default. A value that breaks a documented precondition is
/// reported instead of being passed on.
pub fn synthesize_arguments<P>(operation: &OperationDescriptor, provider: &P) -> Result<Vec<Value>, Violation>
where
    P: ArgumentProvider + ?Sized,
{
    let mut args = Vec::with_capacity(operation.params.len());

    for (index, param) in operation.params.iter().enumerate() {
        let value = match provider.provide(operation, index, param.ty) {
            Some(value) => {
                if value.param_type() != param.ty {
                    return Err(Violation::ProviderTypeMismatch {
                        operation: operation.id(),
                        index,
                        expected: param.ty,
                        actual: value.param_type(),
                    });
                }
                if let Some(precondition) = param.precondition {
                    if !precondition.is_satisfied_by(&value) {
                        return Err(Violation::ProvidedValueRejected {
                            operation: operation.id(),
                            index,
                            param: param.name,
                            precondition,
                            value,
                        });
                    }
                }
                value
            }
            None => {
                let value = param.ty.default_value();
                if let Some(precondition) = param.precondition {
                    if !precondition.is_satisfied_by(&value) {
                        return Err(Violation::PreconditionUnmet {
                            operation: operation.id(),
                            index,
                            param: param.name,
                            precondition,
                            value,
                        });
                    }
                }
                value
            }
        };
        args.push(value);
    }

    Ok(args)
}

/// Compare the arguments passed to the wrapper with those the delegate saw
pub fn compare_arguments(operation: &OperationDescriptor, expected: &[Value], actual: &[Value]) -> Result<(), Violation> {
    if expected.len() != actual.len() {
        return Err(Violation::ArgumentCountMismatch {
            operation: operation.id(),
            expected: expected.len(),
            actual: actual.len(),
        });
    }

    for (index, (e, a)) in expected.iter().zip(actual).enumerate() {
        if !e.matches(a) {
            return Err(Violation::ArgumentMismatch {
                operation: operation.id(),
                index,
                expected: e.clone(),
                actual: a.clone(),
            });
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::provider::{DefaultArguments, ProvidedArguments};
    use std::time::Duration;
    use tether_domain::{ParamSpec, ParamType, Precondition};

    const MIXED: &[ParamSpec] = &[
        ParamSpec::new("flag", ParamType::Bool),
        ParamSpec::new("name", ParamType::Text),
        ParamSpec::new("wait", ParamType::Duration),
        ParamSpec::new("config", ParamType::OptionalText),
    ];
    const POSITIVE: &[ParamSpec] =
        &[ParamSpec::new("bytes", ParamType::I32).requiring(Precondition::Positive)];

    #[test]
    fn test_empty_argument_list() {
        let op = OperationDescriptor::fluent("use_plaintext", &[]);
        assert!(synthesize_arguments(&op, &DefaultArguments).unwrap().is_empty());
    }

    #[test]
    fn test_defaults() {
        let op = OperationDescriptor::fluent("mixed", MIXED);
        let args = synthesize_arguments(&op, &DefaultArguments).unwrap();
        assert_eq!(
            args,
            vec![
                Value::Bool(false),
                Value::Text(String::new()),
                Value::Duration(Duration::ZERO),
                Value::OptionalText(None),
            ]
        );
    }

    #[test]
    fn test_precondition_without_provider() {
        let op = OperationDescriptor::fluent("max_inbound_metadata_size", POSITIVE);
        let err = synthesize_arguments(&op, &DefaultArguments).unwrap_err();
        match err {
            Violation::PreconditionUnmet { index, precondition, .. } => {
                assert_eq!(index, 0);
                assert_eq!(precondition, Precondition::Positive);
            }
            other => panic!("unexpected violation: {}", other),
        }
    }

    #[test]
    fn test_precondition_with_provider() {
        let op = OperationDescriptor::fluent("max_inbound_metadata_size", POSITIVE);
        let provider = ProvidedArguments::new().with("max_inbound_metadata_size", 0, 1i32);
        assert_eq!(synthesize_arguments(&op, &provider).unwrap(), vec![Value::I32(1)]);
    }

    #[test]
    fn test_provider_type_checked() {
        let op = OperationDescriptor::fluent("max_inbound_metadata_size", POSITIVE);
        let provider = crate::provider::from_fn(|_op, _pos, _ty| Some(Value::I64(1)));
        assert!(matches!(
            synthesize_arguments(&op, &provider),
            Err(Violation::ProviderTypeMismatch {
                index: 0,
                expected: ParamType::I32,
                actual: ParamType::I64,
                ..
            })
        ));
    }

    #[test]
    fn test_mistyped_table_entry_falls_back_to_default() {
        let op = OperationDescriptor::fluent("max_inbound_metadata_size", POSITIVE);
        let provider = ProvidedArguments::new().with("max_inbound_metadata_size", 0, 1i64);
        assert!(matches!(
            synthesize_arguments(&op, &provider),
            Err(Violation::PreconditionUnmet { index: 0, .. })
        ));
    }

    #[test]
    fn test_provided_value_checked() {
        let op = OperationDescriptor::fluent("max_inbound_metadata_size", POSITIVE);
        let provider = ProvidedArguments::new().with("max_inbound_metadata_size", 0, -3i32);
        assert!(matches!(
            synthesize_arguments(&op, &provider),
            Err(Violation::ProvidedValueRejected { index: 0, .. })
        ));
    }

    #[test]
    fn test_compare_arguments() {
        let op = OperationDescriptor::fluent("max_inbound_metadata_size", POSITIVE);
        assert!(compare_arguments(&op, &[Value::I32(1)], &[Value::I64(1)]).is_ok());
        assert!(matches!(
            compare_arguments(&op, &[Value::I32(1)], &[Value::I32(2)]),
            Err(Violation::ArgumentMismatch { index: 0, .. })
        ));
        assert!(matches!(
            compare_arguments(&op, &[Value::I32(1)], &[]),
            Err(Violation::ArgumentCountMismatch { expected: 1, actual: 0, .. })
        ));
    }
}
