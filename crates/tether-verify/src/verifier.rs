//! Forwarding verifier
//!
//! Drives every operation of an interface through a wrapper and checks, via
//! the delegate's [`Recorder`], that each call reached the delegate with the
//! same arguments and that fluent calls returned the wrapper itself.

use crate::error::Violation;
use crate::exclusions::Exclusions;
use crate::provider::{ArgumentProvider, DefaultArguments};
use crate::report::{Check, Outcome, VerificationReport};
use crate::synthesis::{compare_arguments, synthesize_arguments};
use tether_domain::{Dispatch, InstanceAddr, OperationDescriptor, Recorder, Returned};
use tracing::{debug, info, warn};

/// Verifies the forwarding contract of a delegating wrapper
///
/// The verifier holds no state of its own between runs: it clears the
/// recorder before each operation, so running it twice against the same
/// wrapper/delegate pair yields the same outcome.
///
/// # Examples
///
/// ```ignore
/// let verifier = ForwardingVerifier::new(recorder)
///     .with_exclusions(Exclusions::new().with("max_inbound_message_size", [ParamType::I32]))
///     .with_provider(ProvidedArguments::new().with("max_inbound_metadata_size", 0, 1i32));
///
/// verifier
///     .verify_forwarding::<ChannelBuilderInterface, _>(&mut wrapper)
///     .assert_success();
/// ```
#[derive(Debug, Clone)]
pub struct ForwardingVerifier<P = DefaultArguments> {
    recorder: Recorder,
    exclusions: Exclusions,
    provider: P,
}

impl ForwardingVerifier<DefaultArguments> {
    /// Create a verifier observing `recorder`
    ///
    /// `recorder` must be the log the wrapper's delegate records into.
    pub fn new(recorder: Recorder) -> Self {
        Self {
            recorder,
            exclusions: Exclusions::new(),
            provider: DefaultArguments,
        }
    }
}

impl<P: ArgumentProvider> ForwardingVerifier<P> {
    /// Set the operations not expected to forward
    pub fn with_exclusions(mut self, exclusions: Exclusions) -> Self {
        self.exclusions = exclusions;
        self
    }

    /// Set the argument provider
    pub fn with_provider<Q: ArgumentProvider>(self, provider: Q) -> ForwardingVerifier<Q> {
        ForwardingVerifier {
            recorder: self.recorder,
            exclusions: self.exclusions,
            provider,
        }
    }

    /// Exclusions in effect
    pub fn exclusions(&self) -> &Exclusions {
        &self.exclusions
    }

    /// Check that every non-excluded fluent operation forwards intact
    ///
    /// For each operation: synthesize arguments, invoke on the wrapper,
    /// expect exactly one matching invocation on the delegate with equal
    /// arguments, then expect the wrapper itself back.
    pub fn verify_forwarding<I, W>(&self, wrapper: &mut W) -> VerificationReport
    where
        I: Dispatch<W>,
    {
        let mut report = VerificationReport::new(I::NAME, Check::Forwarding);

        for operation in I::fluent_operations() {
            if self.exclusions.excludes(operation) {
                debug!("Skipping excluded operation {}", operation);
                report.push(operation.id(), Outcome::Skipped);
                continue;
            }

            debug!("Verifying forwarding of {}", operation);
            let outcome = match self.check_forwarded::<I, W>(wrapper, operation) {
                Ok(()) => Outcome::Passed,
                Err(violation) => {
                    warn!("Forwarding violation: {}", violation);
                    Outcome::Failed(violation)
                }
            };
            report.push(operation.id(), outcome);
        }

        self.recorder.clear();
        info!(
            "Forwarding check on {}: {} passed, {} skipped, {} failed",
            I::NAME,
            report.passed_count(),
            report.skipped_count(),
            report.failed_count()
        );
        report
    }

    fn check_forwarded<I, W>(&self, wrapper: &mut W, operation: &OperationDescriptor) -> Result<(), Violation>
    where
        I: Dispatch<W>,
    {
        let args = synthesize_arguments(operation, &self.provider)?;
        let id = operation.id();
        let addr = InstanceAddr::of(&*wrapper);

        self.recorder.clear();
        let returned = invoke::<I, W>(wrapper, operation, &args)?;
        let calls = self.recorder.take();

        let matching: Vec<_> = calls.iter().filter(|c| c.operation == id).collect();
        match matching.as_slice() {
            [] => {
                return Err(match calls.first() {
                    Some(other) => Violation::WrongOperation {
                        operation: id,
                        actual: other.operation.clone(),
                    },
                    None => Violation::NotForwarded { operation: id },
                });
            }
            [call] => compare_arguments(operation, &args, &call.args)?,
            many => {
                return Err(Violation::ForwardedMoreThanOnce {
                    operation: id,
                    count: many.len(),
                });
            }
        }

        if calls.len() > 1 {
            debug!("{} also caused {} unrelated delegate call(s)", id, calls.len() - 1);
        }

        if !returned.is_instance(addr) {
            return Err(Violation::NotSelf { operation: id });
        }

        Ok(())
    }

    /// Check that every fluent operation returns the wrapper itself
    ///
    /// Excluded operations are checked too: overriding an operation locally
    /// does not exempt it from the fluent contract.
    pub fn verify_returns_self<I, W>(&self, wrapper: &mut W) -> VerificationReport
    where
        I: Dispatch<W>,
    {
        let mut report = VerificationReport::new(I::NAME, Check::ReturnsSelf);

        for operation in I::fluent_operations() {
            let outcome = match self.check_returns_self::<I, W>(wrapper, operation) {
                Ok(()) => Outcome::Passed,
                Err(violation) => {
                    warn!("Identity violation: {}", violation);
                    Outcome::Failed(violation)
                }
            };
            report.push(operation.id(), outcome);
        }

        self.recorder.clear();
        report
    }

    fn check_returns_self<I, W>(&self, wrapper: &mut W, operation: &OperationDescriptor) -> Result<(), Violation>
    where
        I: Dispatch<W>,
    {
        let args = synthesize_arguments(operation, &self.provider)?;
        let addr = InstanceAddr::of(&*wrapper);

        let returned = invoke::<I, W>(wrapper, operation, &args)?;
        if returned.is_instance(addr) {
            Ok(())
        } else {
            Err(Violation::NotSelf {
                operation: operation.id(),
            })
        }
    }

    /// Check that excluded operations never reach the delegate
    ///
    /// Only absence of forwarding is asserted; what the wrapper does locally
    /// instead is left to operation-specific tests.
    pub fn verify_excluded_not_forwarded<I, W>(&self, wrapper: &mut W) -> VerificationReport
    where
        I: Dispatch<W>,
    {
        let mut report = VerificationReport::new(I::NAME, Check::Exclusions);

        for id in self.exclusions.iter() {
            let outcome = match I::find(id) {
                None => Outcome::Failed(Violation::UnknownExclusion { operation: id.clone() }),
                Some(operation) => match self.check_not_forwarded::<I, W>(wrapper, operation) {
                    Ok(()) => Outcome::Passed,
                    Err(violation) => Outcome::Failed(violation),
                },
            };
            if let Outcome::Failed(violation) = &outcome {
                warn!("Exclusion violation: {}", violation);
            }
            report.push(id.clone(), outcome);
        }

        self.recorder.clear();
        report
    }

    fn check_not_forwarded<I, W>(&self, wrapper: &mut W, operation: &OperationDescriptor) -> Result<(), Violation>
    where
        I: Dispatch<W>,
    {
        let args = synthesize_arguments(operation, &self.provider)?;
        let id = operation.id();

        self.recorder.clear();
        invoke::<I, W>(wrapper, operation, &args)?;

        if self.recorder.calls_to(&id).is_empty() {
            Ok(())
        } else {
            Err(Violation::UnexpectedForward { operation: id })
        }
    }

    /// Check that terminal operations return the delegate's product unchanged
    ///
    /// `expected` is the product the delegate was configured to return.
    /// Excluded terminal operations are skipped.
    pub fn verify_build_passthrough<I, W>(&self, wrapper: &mut W, expected: &I::Product) -> VerificationReport
    where
        I: Dispatch<W>,
    {
        let mut report = VerificationReport::new(I::NAME, Check::BuildPassThrough);

        for operation in I::operations().iter().filter(|op| !op.is_fluent()) {
            if self.exclusions.excludes(operation) {
                report.push(operation.id(), Outcome::Skipped);
                continue;
            }

            let outcome = match self.check_passthrough::<I, W>(wrapper, operation, expected) {
                Ok(()) => Outcome::Passed,
                Err(violation) => {
                    warn!("Pass-through violation: {}", violation);
                    Outcome::Failed(violation)
                }
            };
            report.push(operation.id(), outcome);
        }

        self.recorder.clear();
        report
    }

    fn check_passthrough<I, W>(
        &self,
        wrapper: &mut W,
        operation: &OperationDescriptor,
        expected: &I::Product,
    ) -> Result<(), Violation>
    where
        I: Dispatch<W>,
    {
        let args = synthesize_arguments(operation, &self.provider)?;

        match invoke::<I, W>(wrapper, operation, &args)? {
            Returned::Product(product) if I::same_product(&product, expected) => Ok(()),
            _ => Err(Violation::ProductNotPassedThrough {
                operation: operation.id(),
            }),
        }
    }
}

fn invoke<I, W>(
    wrapper: &mut W,
    operation: &OperationDescriptor,
    args: &[tether_domain::Value],
) -> Result<Returned<I::Product>, Violation>
where
    I: Dispatch<W>,
{
    I::dispatch(wrapper, operation, args).map_err(|e| Violation::InvocationFailed {
        operation: operation.id(),
        source: Box::new(e),
    })
}

/// Verify that every method of interface `I` forwards from `wrapper`
///
/// One-call form of [`ForwardingVerifier::verify_forwarding`]: `recorder`
/// is the delegate's log, `exclusions` the operations expected to bypass
/// forwarding and `provider` supplies non-default arguments.
pub fn verify_methods_forwarded<I, W, P>(
    recorder: &Recorder,
    wrapper: &mut W,
    exclusions: Exclusions,
    provider: P,
) -> VerificationReport
where
    I: Dispatch<W>,
    P: ArgumentProvider,
{
    ForwardingVerifier::new(recorder.clone())
        .with_exclusions(exclusions)
        .with_provider(provider)
        .verify_forwarding::<I, W>(wrapper)
}
