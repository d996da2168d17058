use dioxus::prelude::*;
use storage::Table;

use crate::context::AppContext;

/// Restarts `resource` whenever one of `tables` changes.
pub fn use_live_refresh<T: 'static>(tables: &'static [Table], resource: Resource<T>) {
    let always = use_memo(|| true);
    use_live_refresh_while(tables, resource, always);
}

/// Like `use_live_refresh`, but changes are ignored while `active` is false.
pub fn use_live_refresh_while<T: 'static>(
    tables: &'static [Table],
    resource: Resource<T>,
    active: Memo<bool>,
) {
    let ctx = use_context::<AppContext>();
    use_future(move || {
        let mut live = ctx.live(tables);
        let mut resource = resource;
        async move {
            while live.changed().await {
                if !*active.peek() {
                    continue;
                }
                tracing::debug!(?tables, "live refresh");
                resource.restart();
            }
        }
    });
}
