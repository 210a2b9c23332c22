use crate::chain::run_chain;
use crate::error::TaskError;
use crate::lot::Lot;
use crate::record::ResponseRecord;
use crate::request::ItemClient;
use std::str::FromStr;

/// Which request(s) each task of a cycle performs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Scenario {
    /// `POST /item` with lot and index inside the contents list.
    Item,
    /// `POST /item` with lot and index as their own fields.
    LotItem,
    /// `POST /item/onlyoneclient`
    OnlyOneClient,
    /// `POST /item/createclienteverytimeretry`
    CreateClientEveryTimeRetry,
    /// Create, update and read on `/item/onlyoneclient`.
    Chain,
}

impl FromStr for Scenario {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "item" => Ok(Self::Item),
            "lot-item" => Ok(Self::LotItem),
            "only-one-client" => Ok(Self::OnlyOneClient),
            "create-client-every-time-retry" => Ok(Self::CreateClientEveryTimeRetry),
            "chain" => Ok(Self::Chain),
            _ => Err(format!(
                "expected one of item, lot-item, only-one-client, \
                 create-client-every-time-retry, chain, got {s:?}"
            )),
        }
    }
}

/// Every exchange one task attempted, in order.
#[derive(Debug, Default)]
pub struct TaskOutcome {
    pub steps: Vec<Result<ResponseRecord, TaskError>>,
}

impl TaskOutcome {
    #[must_use]
    pub fn is_success(&self) -> bool {
        self.steps.iter().all(Result::is_ok)
    }

    pub fn records(&self) -> impl Iterator<Item = &ResponseRecord> {
        self.steps.iter().filter_map(|step| step.as_ref().ok())
    }

    pub fn errors(&self) -> impl Iterator<Item = &TaskError> {
        self.steps.iter().filter_map(|step| step.as_ref().err())
    }
}

pub async fn run_task(client: &ItemClient, scenario: Scenario, lot: &Lot, index: usize) -> TaskOutcome {
    let steps = match scenario {
        Scenario::Item => vec![client.post_item(lot, index).await],
        Scenario::LotItem => vec![client.post_lot_item(lot, index).await],
        Scenario::OnlyOneClient => vec![client
            .post_only_one_client(lot, index)
            .await
            .map(|created| created.record)],
        Scenario::CreateClientEveryTimeRetry => {
            vec![client.post_create_client_every_time_retry(lot, index).await]
        }
        Scenario::Chain => {
            let outcome = run_chain(client, lot, index).await;
            let mut steps = vec![outcome.create.map(|created| created.record)];
            steps.extend(outcome.update);
            steps.extend(outcome.read);
            steps
        }
    };
    TaskOutcome { steps }
}
