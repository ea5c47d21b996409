//! Data-fetch orchestration and state merging.

use serde_json::{Map, Value};

use crate::component::LoadedModule;
use crate::render::context::RenderContext;
use crate::render::error::{DataRole, RextError};

/// Run the app's data function, then the page's, and merge what they return.
///
/// A failing function aborts the request; nothing is rendered from partial
/// state.
pub async fn fetch_state(
    app: &LoadedModule,
    page: &LoadedModule,
    ctx: &RenderContext,
) -> Result<Option<Value>, RextError> {
    let app_state = run(app, ctx, DataRole::App).await?;
    let page_state = run(page, ctx, DataRole::Page).await?;
    Ok(merge_state(app_state, page_state))
}

async fn run(
    module: &LoadedModule,
    ctx: &RenderContext,
    role: DataRole,
) -> Result<Option<Value>, RextError> {
    let Some(fetch) = &module.data_fetch else {
        return Ok(None);
    };
    fetch.fetch(ctx).await.map_err(|source| {
        tracing::debug!(entry = %ctx.entry, role = %role, error = %source, "Data function failed");
        RextError::DataFetch { role, source }
    })
}

/// Merge app and page state. App values win; page values only fill keys the
/// app left unset, recursively through nested objects.
///
/// `None` when neither side produced anything; a `null` result counts as
/// nothing. Non-object states contribute nothing to the merged object.
pub fn merge_state(app: Option<Value>, page: Option<Value>) -> Option<Value> {
    let app = app.filter(|state| !state.is_null());
    let page = page.filter(|state| !state.is_null());
    if app.is_none() && page.is_none() {
        return None;
    }

    let mut merged = Map::new();
    for source in [app, page].into_iter().flatten() {
        if let Value::Object(source) = source {
            defaults_deep(&mut merged, source);
        }
    }
    Some(Value::Object(merged))
}

fn defaults_deep(target: &mut Map<String, Value>, source: Map<String, Value>) {
    for (key, value) in source {
        match target.get_mut(&key) {
            None => {
                target.insert(key, value);
            }
            Some(Value::Object(existing)) => {
                if let Value::Object(nested) = value {
                    defaults_deep(existing, nested);
                }
            }
            Some(_) => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::component::{component, data_fetch};
    use axum::http::{HeaderMap, Method, Uri};
    use serde_json::json;

    fn module(state: Option<Value>) -> LoadedModule {
        let module = LoadedModule::new(component(|_| Ok(String::new())));
        match state {
            Some(state) => module.with_data_fetch(data_fetch(move |_| {
                let state = state.clone();
                async move { Ok(Some(state)) }
            })),
            None => module,
        }
    }

    fn ctx() -> RenderContext {
        RenderContext::new(Method::GET, Uri::from_static("/"), HeaderMap::new(), "/", "index")
    }

    #[test]
    fn test_app_values_take_precedence() {
        let merged = merge_state(
            Some(json!({ "a": 1, "b": { "x": 1 } })),
            Some(json!({ "b": { "x": 2, "y": 2 }, "c": 3 })),
        );
        assert_eq!(merged, Some(json!({ "a": 1, "b": { "x": 1, "y": 2 }, "c": 3 })));
    }

    #[test]
    fn test_arrays_and_nulls_are_leaves() {
        let merged = merge_state(
            Some(json!({ "list": [1], "gone": null })),
            Some(json!({ "list": [2, 3], "gone": "page" })),
        );
        assert_eq!(merged, Some(json!({ "list": [1], "gone": null })));
    }

    #[test]
    fn test_merge_with_missing_side() {
        assert_eq!(merge_state(None, None), None);
        assert_eq!(merge_state(None, Some(json!({ "p": 1 }))), Some(json!({ "p": 1 })));
        assert_eq!(merge_state(Some(json!(5)), None), Some(json!({})));
    }

    #[test]
    fn test_null_state_counts_as_absent() {
        assert_eq!(merge_state(Some(Value::Null), None), None);
        assert_eq!(merge_state(None, Some(Value::Null)), None);
        assert_eq!(merge_state(Some(Value::Null), Some(Value::Null)), None);
        assert_eq!(
            merge_state(Some(Value::Null), Some(json!({ "p": 1 }))),
            Some(json!({ "p": 1 }))
        );
    }

    #[tokio::test]
    async fn test_fetch_state_null_results() {
        let state = fetch_state(&module(Some(Value::Null)), &module(None), &ctx())
            .await
            .unwrap();
        assert_eq!(state, None);
    }

    #[tokio::test]
    async fn test_fetch_state_without_functions() {
        let state = fetch_state(&module(None), &module(None), &ctx()).await.unwrap();
        assert_eq!(state, None);
    }

    #[tokio::test]
    async fn test_fetch_state_merges_both() {
        let app = module(Some(json!({ "user": { "name": "a" } })));
        let page = module(Some(json!({ "user": { "id": 7 }, "post": 1 })));
        let state = fetch_state(&app, &page, &ctx()).await.unwrap();
        assert_eq!(state, Some(json!({ "user": { "name": "a", "id": 7 }, "post": 1 })));
    }

    #[tokio::test]
    async fn test_page_failure_aborts() {
        let app = module(Some(json!({})));
        let page = LoadedModule::new(component(|_| Ok(String::new())))
            .with_data_fetch(data_fetch(|_| async { Err("nope".into()) }));

        let err = fetch_state(&app, &page, &ctx()).await.unwrap_err();
        assert!(matches!(err, RextError::DataFetch { role: DataRole::Page, .. }));
    }
}
