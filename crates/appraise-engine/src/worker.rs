//! The isolated execution context.
//!
//! A dedicated OS thread owns all calculation state: it shares no memory
//! with callers, receives typed requests over its inbox and replies over a
//! result channel. Requests are processed serially, one at a time; fan-out
//! happens on the dispatcher side, never in here.

use crossbeam::channel::Receiver;
use tokio::sync::mpsc::UnboundedSender;
use tracing::debug;

use appraise_analytics::{break_even, irr, npv, payback_period, project_cash_flows};
use appraise_core::{CalculationOutput, CalculationParameters};

use crate::protocol::{CalculationResult, WorkerMessage, WorkerReply};

/// Spawns the worker thread.
///
/// The thread runs until its inbox closes or a [`WorkerMessage::Shutdown`]
/// arrives, acknowledging the latter before exiting. Dropping the reply
/// sender is the only other way the loop ends — the dispatcher reads that
/// as a crash.
pub(crate) fn spawn(
    inbox: Receiver<WorkerMessage>,
    replies: UnboundedSender<WorkerReply>,
) -> std::io::Result<std::thread::JoinHandle<()>> {
    std::thread::Builder::new()
        .name("appraise-worker".into())
        .spawn(move || run(inbox, replies))
}

fn run(inbox: Receiver<WorkerMessage>, replies: UnboundedSender<WorkerReply>) {
    debug!("worker started");
    while let Ok(message) = inbox.recv() {
        match message {
            WorkerMessage::Calculate(request) => {
                let outcome = evaluate(request.params);
                let reply = WorkerReply::Result(CalculationResult {
                    id: request.id,
                    outcome,
                });
                if replies.send(reply).is_err() {
                    // Dispatcher is gone; nothing left to compute for
                    break;
                }
            }
            WorkerMessage::Shutdown => {
                debug!("worker received shutdown");
                let _ = replies.send(WorkerReply::ShutdownAck);
                break;
            }
        }
    }
    debug!("worker exiting");
}

/// Evaluates one calculation.
///
/// Validation problems and overflow become failure outcomes; business
/// conditions (IRR non-convergence, unreachable break-even) are success
/// outcomes carrying their own explanation.
fn evaluate(params: CalculationParameters) -> Result<CalculationOutput, String> {
    if let Err(e) = params.validate() {
        return Err(e.to_string());
    }

    match params {
        CalculationParameters::Npv(p) => {
            npv(&p.cash_flows, p.discount_rate, p.initial_investment)
                .map(CalculationOutput::Npv)
                .map_err(|e| e.to_string())
        }
        CalculationParameters::Irr(p) => irr(&p.cash_flows, p.guess)
            .map(CalculationOutput::Irr)
            .map_err(|e| e.to_string()),
        CalculationParameters::PaybackPeriod(p) => {
            payback_period(&p.cash_flows, p.initial_investment)
                .map(CalculationOutput::PaybackPeriod)
                .map_err(|e| e.to_string())
        }
        CalculationParameters::BreakEven(p) => {
            break_even(p.fixed_costs, p.variable_cost_per_unit, p.price_per_unit)
                .map(CalculationOutput::BreakEven)
                .map_err(|e| e.to_string())
        }
        CalculationParameters::Projection(p) => {
            project_cash_flows(p.base_cash_flow, p.growth_rate, p.periods, p.discount_rate)
                .map(CalculationOutput::Projection)
                .map_err(|e| e.to_string())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use appraise_core::{BreakEvenParams, CashFlowSeries, NpvParams};
    use crossbeam::channel;
    use tokio::sync::mpsc;

    use crate::protocol::{CalculationRequest, CorrelationId};

    #[test]
    fn test_evaluate_npv() {
        let params = CalculationParameters::Npv(NpvParams {
            cash_flows: CashFlowSeries::new(vec![100.0, 100.0]).unwrap(),
            discount_rate: 0.1,
            initial_investment: 0.0,
        });

        let output = evaluate(params).unwrap();
        assert!(matches!(output, CalculationOutput::Npv(_)));
    }

    #[test]
    fn test_evaluate_rejects_invalid_rate() {
        let params = CalculationParameters::Npv(NpvParams {
            cash_flows: CashFlowSeries::new(vec![100.0]).unwrap(),
            discount_rate: -2.0,
            initial_investment: 0.0,
        });

        let error = evaluate(params).unwrap_err();
        assert!(error.contains("discount_rate"));
    }

    #[tokio::test]
    async fn test_worker_replies_and_acknowledges_shutdown() {
        let (inbox_tx, inbox_rx) = channel::unbounded();
        let (reply_tx, mut reply_rx) = mpsc::unbounded_channel();
        let handle = spawn(inbox_rx, reply_tx).unwrap();

        let id = CorrelationId::new();
        inbox_tx
            .send(WorkerMessage::Calculate(CalculationRequest {
                id,
                params: CalculationParameters::BreakEven(BreakEvenParams {
                    fixed_costs: 1000.0,
                    variable_cost_per_unit: 5.0,
                    price_per_unit: 10.0,
                }),
            }))
            .unwrap();

        match reply_rx.recv().await.unwrap() {
            WorkerReply::Result(result) => {
                assert_eq!(result.id, id);
                assert!(result.outcome.is_ok());
            }
            WorkerReply::ShutdownAck => panic!("expected a calculation result"),
        }

        inbox_tx.send(WorkerMessage::Shutdown).unwrap();
        assert!(matches!(
            reply_rx.recv().await.unwrap(),
            WorkerReply::ShutdownAck
        ));

        handle.join().unwrap();
    }
}
