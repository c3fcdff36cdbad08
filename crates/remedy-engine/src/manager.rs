//! # Control-Loop Manager
//!
//! Installed graphs keyed by control-loop name, live transactions keyed by
//! request id. Transport threads and timers call in concurrently; one
//! `parking_lot::Mutex` over the transaction map serializes every
//! transition of every transaction. Lock hold times are bounded by one
//! transition, which performs no I/O.

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::{Mutex, RwLock};

use remedy_core::{ControlLoopEvent, RequestId};
use remedy_operation::{IncomingMessage, InventoryResolver, OperationConfig};
use remedy_policy::ControlLoopGraph;

use crate::config::EngineConfig;
use crate::error::{EngineError, OnsetRejection};
use crate::registry::ActorRegistry;
use crate::transaction::{
    validate_onset, ControlLoopTransaction, OperationTimer, Step, TransactionContext,
};

/// Entry point for everything the outside world delivers.
#[derive(Debug)]
pub struct ControlLoopManager {
    ctx: TransactionContext,
    graphs: RwLock<HashMap<String, Arc<ControlLoopGraph>>>,
    transactions: Mutex<HashMap<RequestId, ControlLoopTransaction>>,
}

impl ControlLoopManager {
    /// A manager with no installed control loops.
    pub fn new(
        registry: Arc<ActorRegistry>,
        inventory: Arc<dyn InventoryResolver>,
        operation_config: OperationConfig,
        engine_config: EngineConfig,
    ) -> Self {
        Self {
            ctx: TransactionContext {
                registry,
                inventory,
                operation_config,
                engine_config,
            },
            graphs: RwLock::new(HashMap::new()),
            transactions: Mutex::new(HashMap::new()),
        }
    }

    // ─── Graphs ──────────────────────────────────────────────────────

    /// Install a control loop, replacing any graph with the same name.
    /// Live transactions keep the graph they started with.
    pub fn install(&self, graph: ControlLoopGraph) -> Arc<ControlLoopGraph> {
        let graph = Arc::new(graph);
        let replaced = self
            .graphs
            .write()
            .insert(graph.name().to_string(), Arc::clone(&graph))
            .is_some();
        tracing::info!(control_loop = graph.name(), replaced, "control loop installed");
        graph
    }

    /// Remove a control loop. Returns whether it was installed.
    pub fn uninstall(&self, name: &str) -> bool {
        let removed = self.graphs.write().remove(name).is_some();
        if removed {
            tracing::info!(control_loop = name, "control loop removed");
        }
        removed
    }

    /// Look up an installed control loop.
    pub fn graph(&self, name: &str) -> Option<Arc<ControlLoopGraph>> {
        self.graphs.read().get(name).cloned()
    }

    // ─── Transactions ────────────────────────────────────────────────

    /// Deliver an event. An onset starts a transaction; an abatement is
    /// routed to the transaction it names.
    pub fn on_event(&self, event: ControlLoopEvent) -> Result<Step, EngineError> {
        if event.is_abated() {
            let request_id = event.request_id.ok_or(OnsetRejection::NoRequestId)?;
            return self.incoming_message(request_id, &IncomingMessage::Event(event));
        }

        let request_id = validate_onset(&event)?;
        let graph = self
            .graph(&event.closed_loop_control_name)
            .ok_or_else(|| {
                EngineError::UnknownControlLoop(event.closed_loop_control_name.clone())
            })?;

        let mut transactions = self.transactions.lock();
        if transactions.contains_key(&request_id) {
            tracing::warn!(request_id = %request_id, "duplicate onset");
            return Err(EngineError::DuplicateOnset(request_id));
        }
        let limit = self.ctx.engine_config.max_transactions;
        if transactions.len() >= limit {
            return Err(EngineError::TooManyTransactions(limit));
        }
        let (txn, step) = ControlLoopTransaction::start(graph, event, self.ctx.clone())?;
        if !txn.is_final() {
            transactions.insert(request_id, txn);
        }
        Ok(step)
    }

    /// Deliver a response, guard decision or event to one transaction.
    pub fn incoming_message(
        &self,
        request_id: RequestId,
        message: &IncomingMessage,
    ) -> Result<Step, EngineError> {
        self.with_transaction(request_id, |txn| txn.incoming_message(message))
    }

    /// An operation timer fired.
    pub fn operation_timeout(&self, timer: &OperationTimer) -> Result<Step, EngineError> {
        self.with_transaction(timer.request_id, |txn| txn.operation_timeout(timer))
    }

    /// The overall timer of one control loop fired.
    pub fn control_loop_timeout(&self, request_id: RequestId) -> Result<Step, EngineError> {
        self.with_transaction(request_id, ControlLoopTransaction::control_loop_timeout)
    }

    /// Drop a transaction without a final notification. Returns whether
    /// it was live.
    pub fn remove(&self, request_id: RequestId) -> bool {
        self.transactions.lock().remove(&request_id).is_some()
    }

    /// Whether a transaction is live for this request id.
    pub fn contains(&self, request_id: RequestId) -> bool {
        self.transactions.lock().contains_key(&request_id)
    }

    /// Number of live transactions.
    pub fn len(&self) -> usize {
        self.transactions.lock().len()
    }

    /// Whether no transaction is live.
    pub fn is_empty(&self) -> bool {
        self.transactions.lock().is_empty()
    }

    fn with_transaction(
        &self,
        request_id: RequestId,
        f: impl FnOnce(&mut ControlLoopTransaction) -> Step,
    ) -> Result<Step, EngineError> {
        let mut transactions = self.transactions.lock();
        let txn = transactions
            .get_mut(&request_id)
            .ok_or(EngineError::UnknownRequest(request_id))?;
        let step = f(txn);
        if txn.is_final() {
            transactions.remove(&request_id);
            tracing::debug!(request_id = %request_id, "transaction removed");
        }
        Ok(step)
    }
}
