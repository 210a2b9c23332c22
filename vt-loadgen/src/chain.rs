use crate::error::TaskError;
use crate::lot::Lot;
use crate::record::ResponseRecord;
use crate::request::{Created, ItemClient};

/// Results of a create, update, read sequence against one generated key.
///
/// `update` and `read` are `None` when the create never produced a key.
#[derive(Debug)]
pub struct ChainOutcome {
    pub create: Result<Created, TaskError>,
    pub update: Option<Result<ResponseRecord, TaskError>>,
    pub read: Option<Result<ResponseRecord, TaskError>>,
}

impl ChainOutcome {
    #[must_use]
    pub fn key(&self) -> Option<&str> {
        self.create.as_ref().ok().map(|created| created.key.as_str())
    }
}

/// Creates an item, then updates and reads it back by the returned key.
///
/// A failed update does not stop the read. Nothing is rolled back.
pub async fn run_chain(client: &ItemClient, lot: &Lot, index: usize) -> ChainOutcome {
    let created = match client.post_only_one_client(lot, index).await {
        Ok(created) => created,
        Err(e) => {
            return ChainOutcome {
                create: Err(e),
                update: None,
                read: None,
            }
        }
    };

    let update = client.put_only_one_client(lot, index, &created.key).await;
    let read = client.get_only_one_client(lot, index, &created.key).await;
    ChainOutcome {
        create: Ok(created),
        update: Some(update),
        read: Some(read),
    }
}
