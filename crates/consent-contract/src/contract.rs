//! # Invocation Dispatcher
//!
//! Callers address operations by name with positional string arguments:
//!
//! ```text
//! {"function": "CreateConsent",
//!  "args": ["c9", "u1", "svc", "JIO", "true", "2023-05-01", "2024-05-01", "analytics"]}
//! ```
//!
//! `ConsentContract` checks the name, the arity and the boolean argument
//! before touching the world state, then calls the service. `ContractHost`
//! wraps one invocation in one ledger transaction and commits it only when
//! the operation succeeded.

use crate::bootstrap::{consent_indexes, seed};
use crate::domain::entities::Consent;
use crate::domain::errors::{ConsentError, ContractError};
use crate::ports::inbound::ConsentApi;
use crate::service::ConsentService;
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use shared_types::WorldState;
use std::str::FromStr;
use std::sync::Arc;
use tracing::{info, warn};
use world_state::{KeyValueStore, Ledger, LedgerError};

// =============================================================================
// INVOCATION
// =============================================================================

/// A named call with positional arguments.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Invocation {
    pub function: String,
    #[serde(default)]
    pub args: Vec<String>,
}

impl Invocation {
    pub fn new<I, S>(function: impl Into<String>, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            function: function.into(),
            args: args.into_iter().map(Into::into).collect(),
        }
    }
}

/// Operations callers can name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ConsentFunction {
    InitLedger,
    CreateConsent,
    ReadConsent,
    UpdateConsent,
    DeleteConsent,
    ConsentExists,
    GetAllConsents,
    GetConsentsByProvider,
    GetConsentsByUser,
}

impl ConsentFunction {
    pub const ALL: [ConsentFunction; 9] = [
        Self::InitLedger,
        Self::CreateConsent,
        Self::ReadConsent,
        Self::UpdateConsent,
        Self::DeleteConsent,
        Self::ConsentExists,
        Self::GetAllConsents,
        Self::GetConsentsByProvider,
        Self::GetConsentsByUser,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Self::InitLedger => "InitLedger",
            Self::CreateConsent => "CreateConsent",
            Self::ReadConsent => "ReadConsent",
            Self::UpdateConsent => "UpdateConsent",
            Self::DeleteConsent => "DeleteConsent",
            Self::ConsentExists => "ConsentExists",
            Self::GetAllConsents => "GetAllConsents",
            Self::GetConsentsByProvider => "GetConsentsByProvider",
            Self::GetConsentsByUser => "GetConsentsByUser",
        }
    }

    /// Number of positional arguments.
    pub fn arity(self) -> usize {
        match self {
            Self::InitLedger | Self::GetAllConsents => 0,
            Self::ReadConsent
            | Self::DeleteConsent
            | Self::ConsentExists
            | Self::GetConsentsByProvider
            | Self::GetConsentsByUser => 1,
            Self::CreateConsent | Self::UpdateConsent => 8,
        }
    }

}

impl FromStr for ConsentFunction {
    type Err = ContractError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|f| f.name() == s)
            .ok_or_else(|| ContractError::UnknownFunction(s.to_string()))
    }
}

/// A fully validated call.
#[derive(Debug, Clone, PartialEq, Eq)]
enum Call {
    InitLedger,
    Create(Consent),
    Read(String),
    Update(Consent),
    Delete(String),
    Exists(String),
    All,
    ByProvider(String),
    ByUser(String),
}

impl Call {
    fn parse(invocation: &Invocation) -> Result<Self, ContractError> {
        let function: ConsentFunction = invocation.function.parse()?;
        let args = &invocation.args;
        if args.len() != function.arity() {
            return Err(ContractError::Arity {
                function: function.name(),
                expected: function.arity(),
                found: args.len(),
            });
        }
        let single = || args[0].clone();

        Ok(match function {
            ConsentFunction::InitLedger => Self::InitLedger,
            ConsentFunction::CreateConsent => Self::Create(consent_from_args(function, args)?),
            ConsentFunction::UpdateConsent => Self::Update(consent_from_args(function, args)?),
            ConsentFunction::ReadConsent => Self::Read(single()),
            ConsentFunction::DeleteConsent => Self::Delete(single()),
            ConsentFunction::ConsentExists => Self::Exists(single()),
            ConsentFunction::GetAllConsents => Self::All,
            ConsentFunction::GetConsentsByProvider => Self::ByProvider(single()),
            ConsentFunction::GetConsentsByUser => Self::ByUser(single()),
        })
    }
}

/// `id, userId, service, provider, consentGiven, timestamp, expirationDate, purpose`
fn consent_from_args(function: ConsentFunction, args: &[String]) -> Result<Consent, ContractError> {
    Ok(Consent {
        id: args[0].clone(),
        user_id: args[1].clone(),
        service: args[2].clone(),
        provider: args[3].clone(),
        consent_given: parse_bool(function, 4, &args[4])?,
        timestamp: args[5].clone(),
        expiration_date: args[6].clone(),
        purpose: args[7].clone(),
    })
}

fn parse_bool(function: ConsentFunction, position: usize, value: &str) -> Result<bool, ContractError> {
    if value.eq_ignore_ascii_case("true") {
        Ok(true)
    } else if value.eq_ignore_ascii_case("false") {
        Ok(false)
    } else {
        Err(ContractError::InvalidBool {
            function: function.name(),
            position,
            value: value.to_string(),
        })
    }
}

fn to_payload<T: Serialize>(value: &T) -> Result<Value, ContractError> {
    serde_json::to_value(value).map_err(|e| {
        ContractError::Consent(ConsentError::Serialization {
            id: String::new(),
            message: e.to_string(),
        })
    })
}

// =============================================================================
// CONTRACT
// =============================================================================

/// Routes invocations to a [`ConsentApi`].
#[derive(Debug, Clone, Default)]
pub struct ConsentContract<A: ConsentApi = ConsentService> {
    api: A,
}

impl ConsentContract<ConsentService> {
    pub fn new() -> Self {
        Self::with_api(ConsentService::new())
    }
}

impl<A: ConsentApi> ConsentContract<A> {
    pub fn with_api(api: A) -> Self {
        Self { api }
    }

    /// Validate and run `invocation` against `ctx`, returning the JSON
    /// result. Unit results are `null`.
    pub fn invoke(
        &self,
        ctx: &mut dyn WorldState,
        invocation: &Invocation,
    ) -> Result<Value, ContractError> {
        let call = Call::parse(invocation)?;
        let api = &self.api;
        match call {
            Call::InitLedger => {
                seed(ctx)?;
                Ok(Value::Null)
            }
            Call::Create(consent) => {
                api.create_consent(ctx, consent)?;
                Ok(Value::Null)
            }
            Call::Update(consent) => {
                api.update_consent(ctx, consent)?;
                Ok(Value::Null)
            }
            Call::Delete(id) => {
                api.delete_consent(ctx, &id)?;
                Ok(Value::Null)
            }
            Call::Read(id) => to_payload(&api.read_consent(ctx, &id)?),
            Call::Exists(id) => Ok(Value::Bool(api.consent_exists(ctx, &id)?)),
            Call::All => to_payload(&api.all_consents(ctx)?),
            Call::ByProvider(provider) => to_payload(&api.consents_by_provider(ctx, &provider)?),
            Call::ByUser(user_id) => to_payload(&api.consents_by_user(ctx, &user_id)?),
        }
    }
}

// =============================================================================
// HOST
// =============================================================================

/// Result of one invocation as returned to the caller.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InvocationResponse {
    /// 200 on success, 400 for requests rejected before touching the world
    /// state, 500 otherwise.
    pub status: u16,
    #[serde(default)]
    pub payload: Value,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tx_id: Option<String>,
}

impl InvocationResponse {
    pub const OK: u16 = 200;
    pub const BAD_REQUEST: u16 = 400;
    pub const ERROR: u16 = 500;

    pub fn success(tx_id: impl Into<String>, payload: Value) -> Self {
        Self {
            status: Self::OK,
            payload,
            message: String::new(),
            tx_id: Some(tx_id.into()),
        }
    }

    pub fn failure(tx_id: Option<String>, error: &ContractError) -> Self {
        let status = if error.is_bad_request() {
            Self::BAD_REQUEST
        } else {
            Self::ERROR
        };
        Self {
            status,
            payload: Value::Null,
            message: error.to_string(),
            tx_id,
        }
    }

    /// The request could not be decoded into an invocation at all.
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self {
            status: Self::BAD_REQUEST,
            payload: Value::Null,
            message: message.into(),
            tx_id: None,
        }
    }

    pub fn is_success(&self) -> bool {
        self.status == Self::OK
    }
}

/// Invocation counters.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct HostStats {
    pub invocations: u64,
    pub committed: u64,
    pub failed: u64,
    /// Failures caused by MVCC or phantom conflicts at commit.
    pub conflicts: u64,
}

/// Runs each invocation in its own ledger transaction.
pub struct ContractHost<B: KeyValueStore, A: ConsentApi = ConsentService> {
    ledger: Arc<Ledger<B>>,
    namespace: String,
    contract: ConsentContract<A>,
    stats: RwLock<HostStats>,
}

impl<B: KeyValueStore> ContractHost<B, ConsentService> {
    /// Host the consent contract in `namespace`, installing its indexes.
    pub fn new(ledger: Arc<Ledger<B>>, namespace: impl Into<String>) -> Result<Self, LedgerError> {
        Self::with_contract(ledger, namespace, ConsentContract::new())
    }
}

impl<B: KeyValueStore, A: ConsentApi> ContractHost<B, A> {
    pub fn with_contract(
        ledger: Arc<Ledger<B>>,
        namespace: impl Into<String>,
        contract: ConsentContract<A>,
    ) -> Result<Self, LedgerError> {
        let namespace = namespace.into();
        ledger.define_index(&namespace, consent_indexes())?;
        Ok(Self {
            ledger,
            namespace,
            contract,
            stats: RwLock::new(HostStats::default()),
        })
    }

    pub fn ledger(&self) -> &Arc<Ledger<B>> {
        &self.ledger
    }

    pub fn stats(&self) -> HostStats {
        self.stats.read().clone()
    }

    /// Run `invocation` and commit its writes if it succeeds.
    pub fn invoke(&self, invocation: &Invocation) -> InvocationResponse {
        let (tx_id, result) = self.execute(invocation);

        let mut stats = self.stats.write();
        stats.invocations += 1;
        match result {
            Ok(payload) => {
                stats.committed += 1;
                InvocationResponse::success(tx_id.unwrap_or_default(), payload)
            }
            Err(e) => {
                stats.failed += 1;
                if e.is_retryable() {
                    stats.conflicts += 1;
                }
                warn!(
                    function = %invocation.function,
                    tx_id = tx_id.as_deref().unwrap_or("-"),
                    error = %e,
                    "Invocation rejected"
                );
                InvocationResponse::failure(tx_id, &e)
            }
        }
    }

    /// Seed the example records in a transaction of their own.
    pub fn init_ledger(&self) -> InvocationResponse {
        self.invoke(&Invocation::new(
            ConsentFunction::InitLedger.name(),
            Vec::<String>::new(),
        ))
    }

    fn execute(&self, invocation: &Invocation) -> (Option<String>, Result<Value, ContractError>) {
        let mut tx = match self.ledger.begin(&self.namespace) {
            Ok(tx) => tx,
            Err(e) => return (None, Err(e.into())),
        };
        let tx_id = tx.tx_id().to_string();

        let payload = match self.contract.invoke(&mut tx, invocation) {
            Ok(payload) => payload,
            // Dropping the transaction discards its writes.
            Err(e) => return (Some(tx_id), Err(e)),
        };

        match tx.commit() {
            Ok(receipt) => {
                info!(
                    function = %invocation.function,
                    tx_id = %receipt.tx_id,
                    version = ?receipt.version,
                    "Invocation committed"
                );
                (Some(tx_id), Ok(payload))
            }
            Err(e) => (Some(tx_id), Err(e.into())),
        }
    }
}

impl<B: KeyValueStore, A: ConsentApi> std::fmt::Debug for ContractHost<B, A> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ContractHost")
            .field("namespace", &self.namespace)
            .field("stats", &*self.stats.read())
            .finish_non_exhaustive()
    }
}
