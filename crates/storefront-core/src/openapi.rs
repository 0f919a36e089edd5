//! Helpers for assembling the combined OpenAPI document

use utoipa::openapi::{ComponentsBuilder, InfoBuilder, OpenApi, OpenApiBuilder, ServerBuilder};

/// Empty document carrying the service metadata; plugin documents are merged into it
pub fn base_document() -> OpenApi {
    OpenApiBuilder::new()
        .info(
            InfoBuilder::new()
                .title("Storefront")
                .description(Some(
                    "Tracking ingestion, analytics reports, order lifecycle and support chat",
                ))
                .version(env!("CARGO_PKG_VERSION"))
                .build(),
        )
        .servers(Some(vec![ServerBuilder::new()
            .url("/api")
            .description(Some("Base path for all API endpoints"))
            .build()]))
        .components(Some(ComponentsBuilder::new().build()))
        .build()
}

/// Merge the paths, schemas, responses and tags of `other` into `base`
pub fn merge(mut base: OpenApi, other: OpenApi) -> OpenApi {
    base.paths.paths.extend(other.paths.paths);

    if let Some(components) = other.components {
        let target = base
            .components
            .get_or_insert_with(|| ComponentsBuilder::new().build());
        target.schemas.extend(components.schemas);
        target.responses.extend(components.responses);
    }

    if let Some(tags) = other.tags {
        let target = base.tags.get_or_insert_with(Vec::new);
        for tag in tags {
            if !target.iter().any(|t| t.name == tag.name) {
                target.push(tag);
            }
        }
    }

    base
}

#[cfg(test)]
mod tests {
    use super::*;
    use utoipa::openapi::path::{HttpMethod, OperationBuilder, PathItem, PathsBuilder};
    use utoipa::openapi::tag::TagBuilder;

    fn doc_with(path: &str, tag: &str) -> OpenApi {
        OpenApiBuilder::new()
            .paths(
                PathsBuilder::new()
                    .path(path, PathItem::new(HttpMethod::Get, OperationBuilder::new().build())),
            )
            .tags(Some(vec![TagBuilder::new().name(tag).build()]))
            .build()
    }

    #[test]
    fn test_merge_combines_paths_and_dedups_tags() {
        let merged = merge(base_document(), doc_with("/orders", "Orders"));
        let merged = merge(merged, doc_with("/orders/{id}", "Orders"));
        let merged = merge(merged, doc_with("/track", "Tracking"));

        assert_eq!(merged.paths.paths.len(), 3);
        assert_eq!(merged.tags.unwrap().len(), 2);
        assert_eq!(merged.info.title, "Storefront");
    }
}
