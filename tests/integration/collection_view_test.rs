//! Collection view behavior as seen through a mounted screen

mod common;

use atrium_catalog::EntityType;
use atrium_common::FieldValue;
use atrium_view::{EmptyState, SortRule};

use crate::common::{entity, resource, twelve_resources, TestScreen};

mod pagination {
    use super::*;

    #[test_log::test(tokio::test)]
    async fn test_twelve_resources_filtered_to_three_rooms() {
        let test = TestScreen::loaded(EntityType::Resource, twelve_resources()).await;
        let screen = &test.screen;

        assert_eq!(screen.page_count().unwrap(), 2);
        screen.set_page(1).unwrap();
        assert_eq!(screen.visible_rows().unwrap().len(), 2);

        screen
            .set_column_filter("category", vec![FieldValue::text("room")])
            .unwrap();

        let snapshot = screen.snapshot().unwrap();
        assert_eq!(snapshot.page_count, 1);
        assert_eq!(snapshot.page_index, 0);
        assert_eq!(snapshot.rows.len(), 3);
        assert_eq!(snapshot.total_count, 3);
        assert_eq!(snapshot.raw_count, 12);
    }

    #[test_log::test(tokio::test)]
    async fn test_page_size_change_returns_to_first_page() {
        let test = TestScreen::loaded(EntityType::Resource, twelve_resources()).await;
        test.screen.set_page(1).unwrap();
        test.screen.set_page_size(5).unwrap();

        assert_eq!(test.screen.page_index().unwrap(), 0);
        assert_eq!(test.screen.page_count().unwrap(), 3);
    }

    #[test_log::test(tokio::test)]
    async fn test_removal_shrinking_last_page_clamps_index() {
        let test = TestScreen::loaded(EntityType::Resource, twelve_resources()).await;
        test.screen.set_page_size(11).unwrap();
        test.screen.set_page(1).unwrap();
        assert_eq!(test.visible_ids(), vec!["res-12".to_string()]);

        test.screen.remove("res-12").await.unwrap();
        assert_eq!(test.screen.page_count().unwrap(), 1);
        assert_eq!(test.screen.page_index().unwrap(), 0);
        assert_eq!(test.screen.visible_rows().unwrap().len(), 11);
    }
}

mod empty_states {
    use super::*;

    #[test_log::test(tokio::test)]
    async fn test_no_match_query_is_filtered_not_no_data() {
        let test = TestScreen::loaded(EntityType::Resource, twelve_resources()).await;
        test.screen.set_global_query("zzz-no-match").unwrap();

        let snapshot = test.screen.snapshot().unwrap();
        assert_eq!(snapshot.empty_state, EmptyState::EmptyFiltered);
        assert!(snapshot.rows.is_empty());
        assert_eq!(snapshot.page_index, 0);

        test.screen.clear_filters().unwrap();
        assert_eq!(test.screen.empty_state().unwrap(), EmptyState::Populated);
    }

    #[test_log::test(tokio::test)]
    async fn test_empty_collection_is_no_data_even_with_query() {
        let test = TestScreen::loaded(EntityType::Resource, Vec::new()).await;
        assert_eq!(test.screen.empty_state().unwrap(), EmptyState::EmptyNoData);

        test.screen.set_global_query("anything").unwrap();
        assert_eq!(test.screen.empty_state().unwrap(), EmptyState::EmptyNoData);
    }

    #[test_log::test(tokio::test)]
    async fn test_other_entity_types_are_not_listed() {
        let test = TestScreen::loaded(EntityType::Service, twelve_resources()).await;
        assert_eq!(test.screen.empty_state().unwrap(), EmptyState::EmptyNoData);
    }
}

mod searching {
    use super::*;

    #[test_log::test(tokio::test)]
    async fn test_fuzzy_query_tolerates_typo() {
        let test = TestScreen::loaded(EntityType::Resource, twelve_resources()).await;
        test.screen.set_global_query("delivrey").unwrap();
        assert_eq!(test.visible_ids(), vec!["res-02".to_string()]);
    }

    #[test_log::test(tokio::test)]
    async fn test_query_and_column_filter_combine() {
        let test = TestScreen::loaded(EntityType::Resource, twelve_resources()).await;
        test.screen.set_global_query("room").unwrap();
        test.screen
            .set_column_filter("status", vec![FieldValue::text("FREE")])
            .unwrap();
        assert_eq!(
            test.visible_ids(),
            vec!["res-01".to_string(), "res-04".to_string()]
        );
    }

    #[test_log::test(tokio::test)]
    async fn test_status_filter_is_case_sensitive() {
        let test = TestScreen::loaded(EntityType::Resource, twelve_resources()).await;
        test.screen
            .set_column_filter("status", vec![FieldValue::text("free")])
            .unwrap();
        assert_eq!(test.screen.total_count().unwrap(), 0);

        test.screen
            .set_column_filter("status", vec![FieldValue::text("FREE")])
            .unwrap();
        assert!(test.screen.total_count().unwrap() > 0);
    }

    #[test_log::test(tokio::test)]
    async fn test_repeated_filtering_is_idempotent() {
        let test = TestScreen::loaded(EntityType::Resource, twelve_resources()).await;
        test.screen.set_global_query("room").unwrap();
        let first = test.visible_ids();
        test.screen.set_global_query("room").unwrap();
        assert_eq!(test.visible_ids(), first);
    }

    #[test_log::test(tokio::test)]
    async fn test_facets_list_distinct_categories() {
        let test = TestScreen::loaded(EntityType::Resource, twelve_resources()).await;
        assert_eq!(
            test.screen.facet_values("category").unwrap(),
            vec![
                FieldValue::text("equipment"),
                FieldValue::text("room"),
                FieldValue::text("vehicle"),
            ]
        );
    }
}

mod sorting {
    use super::*;

    fn product(id: &str, name: &str, price: FieldValue) -> atrium_catalog::Entity {
        entity(
            id,
            EntityType::Product,
            "ACTIVE",
            &[("name", FieldValue::text(name)), ("price", price)],
        )
    }

    #[test_log::test(tokio::test)]
    async fn test_prices_sort_numerically() {
        let test = TestScreen::loaded(
            EntityType::Product,
            vec![
                product("p1", "Hundred", FieldValue::Number(100.0)),
                product("p2", "Nine", FieldValue::text("9")),
                product("p3", "Ten", FieldValue::Number(10.0)),
            ],
        )
        .await;

        test.screen.toggle_sort("price").unwrap();
        assert_eq!(test.visible_ids(), vec!["p2", "p3", "p1"]);

        test.screen.toggle_sort("price").unwrap();
        assert_eq!(test.visible_ids(), vec!["p1", "p3", "p2"]);

        // Third click removes the sort, back to repository order
        test.screen.toggle_sort("price").unwrap();
        assert_eq!(test.visible_ids(), vec!["p1", "p2", "p3"]);
    }

    #[test_log::test(tokio::test)]
    async fn test_dates_sort_chronologically() {
        let service = |id: &str, starts_at: &str| {
            entity(
                id,
                EntityType::Service,
                "PLANNED",
                &[
                    ("name", FieldValue::text(id)),
                    ("startsAt", FieldValue::text(starts_at)),
                ],
            )
        };
        let test = TestScreen::loaded(
            EntityType::Service,
            vec![
                service("s1", "2024-11-02"),
                service("s2", "2024-02-11"),
                service("s3", "2023-12-31"),
            ],
        )
        .await;

        test.screen
            .set_sort(vec![SortRule::ascending("startsAt")])
            .unwrap();
        assert_eq!(test.visible_ids(), vec!["s3", "s2", "s1"]);
    }

    #[test_log::test(tokio::test)]
    async fn test_equal_keys_keep_repository_order() {
        let test = TestScreen::loaded(EntityType::Resource, twelve_resources()).await;
        test.screen
            .set_sort(vec![SortRule::descending("category")])
            .unwrap();
        assert_eq!(
            test.visible_ids()[..5],
            ["res-02", "res-05", "res-08", "res-10", "res-12"]
        );
    }

    #[test_log::test(tokio::test)]
    async fn test_text_sort_ignores_case() {
        let test = TestScreen::loaded(
            EntityType::Resource,
            vec![
                resource("a", "beta", "room", "FREE"),
                resource("b", "Alpha", "room", "FREE"),
                resource("c", "alpha", "room", "FREE"),
            ],
        )
        .await;
        test.screen.set_sort(vec![SortRule::ascending("name")]).unwrap();
        assert_eq!(test.visible_ids(), vec!["b", "c", "a"]);
    }
}

mod selection {
    use super::*;

    #[test_log::test(tokio::test)]
    async fn test_selection_survives_sort_and_filter() {
        let test = TestScreen::loaded(EntityType::Resource, twelve_resources()).await;
        test.screen.toggle_selection("res-01").unwrap();
        test.screen.toggle_selection("res-02").unwrap();

        test.screen.toggle_sort("name").unwrap();
        test.screen.set_global_query("room").unwrap();
        test.screen.set_page(3).unwrap();

        assert_eq!(
            test.screen.selected_ids().unwrap(),
            vec!["res-01".to_string(), "res-02".to_string()]
        );
    }

    #[test_log::test(tokio::test)]
    async fn test_unknown_id_is_not_selectable() {
        let test = TestScreen::loaded(EntityType::Resource, twelve_resources()).await;
        assert!(!test.screen.toggle_selection("ghost").unwrap());
        assert!(test.screen.selected_ids().unwrap().is_empty());
    }

    #[test_log::test(tokio::test)]
    async fn test_select_all_on_page_only_selects_visible_rows() {
        let test = TestScreen::loaded(EntityType::Resource, twelve_resources()).await;
        test.screen.select_all_on_page().unwrap();

        let snapshot = test.screen.snapshot().unwrap();
        assert_eq!(snapshot.selected_count, 10);
        assert!(snapshot.page_fully_selected);

        test.screen.set_page(1).unwrap();
        assert!(!test.screen.snapshot().unwrap().page_fully_selected);

        test.screen.clear_selection().unwrap();
        assert!(test.screen.selected_ids().unwrap().is_empty());
    }
}
