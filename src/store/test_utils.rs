//! Shared setup for record-store tests: an initialized store over the
//! in-memory spreadsheet double, with a handle to the raw fake for
//! assertions on worksheet contents.

use crate::sheets::test_utils::{test_tuning, InMemorySheets};
use crate::sheets::SheetsApi;
use crate::store::{init_store, SheetStore};
use std::sync::Arc;

pub(crate) async fn setup_store() -> (Arc<InMemorySheets>, SheetStore) {
    let api = Arc::new(InMemorySheets::default());
    let store = SheetStore::with_api(Arc::clone(&api) as Arc<dyn SheetsApi>, test_tuning());
    init_store(&store).await.expect("init against fake");
    (api, store)
}
