#[cfg(test)]
mod tests {
    use crate::db::{NodeStore, TreeError};
    use crate::models::{
        ContainerConfig, MarkdownConfig, Node, NodeConfig, NodeId, ValidationError,
    };
    use serde_json::json;

    fn container() -> NodeConfig {
        NodeConfig::Container(ContainerConfig::default())
    }

    fn markdown(content: &str) -> NodeConfig {
        NodeConfig::Markdown(MarkdownConfig {
            content: content.to_string(),
        })
    }

    fn assert_dense(store: &NodeStore, parent: &NodeId) {
        let orders: Vec<u32> = store
            .get_children(parent.as_str())
            .unwrap()
            .iter()
            .map(|n| n.order)
            .collect();
        let expected: Vec<u32> = (0..orders.len() as u32).collect();
        assert_eq!(orders, expected, "sibling order under {} is not dense", parent);
    }

    /// root(Container) -> [a(Markdown), b(Container) -> [c(Markdown), d(Markdown)], e(Markdown)]
    fn sample_tree() -> (NodeStore, NodeId, NodeId, NodeId, NodeId, NodeId, NodeId) {
        let mut store = NodeStore::new();
        let root = store.create_node(None, container(), None).unwrap().id;
        let a = store.create_node(Some(&root), markdown("a"), None).unwrap().id;
        let b = store.create_node(Some(&root), container(), None).unwrap().id;
        let c = store.create_node(Some(&b), markdown("c"), None).unwrap().id;
        let d = store.create_node(Some(&b), markdown("d"), None).unwrap().id;
        let e = store.create_node(Some(&root), markdown("e"), None).unwrap().id;
        (store, root, a, b, c, d, e)
    }

    #[test]
    fn test_create_appends_by_default() {
        let (store, root, a, b, _, _, e) = sample_tree();
        assert_eq!(store.child_ids(root.as_str()), &[a, b, e]);
        assert_dense(&store, &root);
        assert_eq!(store.roots().count(), 1);
        assert_eq!(store.len(), 6);
    }

    #[test]
    fn test_create_at_index_shifts_siblings() {
        let (mut store, root, a, b, _, _, e) = sample_tree();
        let first = store
            .create_node(Some(&root), markdown("first"), Some(0))
            .unwrap();
        assert_eq!(first.order, 0);
        assert_eq!(
            store.child_ids(root.as_str()),
            &[first.id.clone(), a, b, e]
        );
        assert_dense(&store, &root);
    }

    #[test]
    fn test_create_index_past_end_appends() {
        let (mut store, root, _, _, _, _, _) = sample_tree();
        let last = store
            .create_node(Some(&root), markdown("last"), Some(99))
            .unwrap();
        assert_eq!(last.order, 3);
        assert_eq!(store.child_ids(root.as_str()).last(), Some(&last.id));
    }

    #[test]
    fn test_create_under_missing_parent_fails() {
        let mut store = NodeStore::new();
        let err = store
            .create_node(Some(&NodeId::from("ghost")), markdown("x"), None)
            .unwrap_err();
        assert!(matches!(err, TreeError::InvalidParent { .. }));
        assert!(store.is_empty());
    }

    #[test]
    fn test_create_under_leaf_kind_fails() {
        let (mut store, _, a, _, _, _, _) = sample_tree();
        let err = store.create_node(Some(&a), markdown("x"), None).unwrap_err();
        assert_eq!(
            err,
            TreeError::invalid_parent(a.as_str(), "Markdown nodes cannot have children")
        );
    }

    #[test]
    fn test_insert_duplicate_id_fails() {
        let (mut store, root, a, _, _, _, _) = sample_tree();
        let err = store
            .insert_node(a.clone(), Some(root), markdown("dup"), None)
            .unwrap_err();
        assert_eq!(
            err,
            TreeError::Validation(ValidationError::DuplicateId(a.to_string()))
        );
    }

    #[test]
    fn test_update_config_merges_shallowly() {
        let (mut store, _, a, _, _, _, _) = sample_tree();
        let updated = store
            .update_config(a.as_str(), &json!({ "content": "changed" }))
            .unwrap();
        assert_eq!(updated.config, markdown("changed"));
        assert_eq!(store.get_node(a.as_str()).unwrap().config, markdown("changed"));
    }

    #[test]
    fn test_update_config_rejects_type_change() {
        let (mut store, _, a, _, _, _, _) = sample_tree();
        let before = store.clone();
        let err = store
            .update_config(a.as_str(), &json!({ "type": "Title" }))
            .unwrap_err();
        assert!(matches!(
            err,
            TreeError::Validation(ValidationError::TypeChange { .. })
        ));
        assert_eq!(store, before);
    }

    #[test]
    fn test_move_reorders_within_parent() {
        let (mut store, root, a, b, _, _, e) = sample_tree();
        store.move_node(e.as_str(), Some(&root), Some(0)).unwrap();
        assert_eq!(store.child_ids(root.as_str()), &[e, a, b]);
        assert_dense(&store, &root);
    }

    #[test]
    fn test_move_across_parents_reindexes_both() {
        let (mut store, root, a, b, c, d, e) = sample_tree();
        let moved = store.move_node(c.as_str(), Some(&root), Some(1)).unwrap();
        assert_eq!(moved.parent_id, Some(root.clone()));
        assert_eq!(store.child_ids(root.as_str()), &[a, c, b.clone(), e]);
        assert_eq!(store.child_ids(b.as_str()), &[d]);
        assert_dense(&store, &root);
        assert_dense(&store, &b);
    }

    #[test]
    fn test_move_under_self_is_cycle() {
        let (mut store, _, _, b, _, _, _) = sample_tree();
        let err = store.move_node(b.as_str(), Some(&b), None).unwrap_err();
        assert_eq!(err, TreeError::cycle_detected(b.as_str(), b.as_str()));
    }

    #[test]
    fn test_move_under_descendant_is_cycle() {
        let (mut store, root, _, b, _, _, _) = sample_tree();
        let inner = store.create_node(Some(&b), container(), None).unwrap().id;
        let before = store.clone();

        let err = store.move_node(b.as_str(), Some(&inner), None).unwrap_err();
        assert!(matches!(err, TreeError::CycleDetected { .. }));
        assert_eq!(store, before);

        let err = store.move_node(root.as_str(), Some(&inner), None).unwrap_err();
        assert!(matches!(err, TreeError::CycleDetected { .. }));
    }

    #[test]
    fn test_move_to_root_set() {
        let (mut store, root, a, b, _, _, e) = sample_tree();
        let moved = store.move_node(b.as_str(), None, None).unwrap();
        assert!(moved.is_root());
        assert_eq!(moved.order, 0);
        assert_eq!(store.roots().count(), 2);
        assert_eq!(store.child_ids(root.as_str()), &[a, e]);
        assert_dense(&store, &root);
    }

    #[test]
    fn test_delete_cascades_and_reindexes() {
        let (mut store, root, a, b, c, d, e) = sample_tree();
        let removed = store.delete_node(b.as_str(), true).unwrap();

        assert_eq!(removed, vec![b.clone(), c.clone(), d.clone()]);
        assert_eq!(store.len(), 3);
        for id in [&b, &c, &d] {
            assert!(store.get_node(id.as_str()).is_none());
        }
        assert_eq!(store.child_ids(root.as_str()), &[a, e.clone()]);
        assert_eq!(store.get_node(e.as_str()).unwrap().order, 1);
        assert!(store.child_ids(b.as_str()).is_empty());
    }

    #[test]
    fn test_delete_without_cascade_requires_leaf() {
        let (mut store, root, a, b, _, _, _) = sample_tree();
        let err = store.delete_node(b.as_str(), false).unwrap_err();
        assert_eq!(
            err,
            TreeError::Validation(ValidationError::HasChildren(b.to_string()))
        );

        let removed = store.delete_node(a.as_str(), false).unwrap();
        assert_eq!(removed, vec![a]);
        assert_dense(&store, &root);
    }

    #[test]
    fn test_descendants_are_pre_order() {
        let (store, root, a, b, c, d, e) = sample_tree();
        assert_eq!(store.descendants(root.as_str()).unwrap(), vec![a, b, c, d, e]);
        assert!(matches!(
            store.descendants("missing"),
            Err(TreeError::NodeNotFound(_))
        ));
    }

    #[test]
    fn test_depth_and_height() {
        let (store, root, a, b, c, _, _) = sample_tree();
        assert_eq!(store.depth(root.as_str()), Some(0));
        assert_eq!(store.depth(c.as_str()), Some(2));
        assert_eq!(store.depth("missing"), None);

        assert_eq!(store.height(root.as_str()), 2);
        assert_eq!(store.height(b.as_str()), 1);
        assert_eq!(store.height(a.as_str()), 0);
    }

    #[test]
    fn test_depth_of_dangling_chain_is_unknown() {
        let orphan = Node::new(NodeId::from("x"), Some(NodeId::from("gone")), markdown("x"));
        let store = NodeStore::from_nodes(vec![orphan]).unwrap();
        assert_eq!(store.depth("x"), None);
    }

    #[test]
    fn test_is_descendant() {
        let (store, root, a, b, c, _, _) = sample_tree();
        assert!(store.is_descendant(root.as_str(), c.as_str()));
        assert!(store.is_descendant(b.as_str(), c.as_str()));
        assert!(!store.is_descendant(a.as_str(), c.as_str()));
        assert!(!store.is_descendant(c.as_str(), c.as_str()));
    }

    #[test]
    fn test_mixed_sequence_keeps_order_dense() {
        let (mut store, root, a, b, c, _, e) = sample_tree();
        store.move_node(a.as_str(), Some(&b), Some(1)).unwrap();
        store.create_node(Some(&root), markdown("x"), Some(1)).unwrap();
        store.delete_node(c.as_str(), true).unwrap();
        store.move_node(e.as_str(), Some(&b), Some(0)).unwrap();

        for parent in [&root, &b] {
            assert_dense(&store, parent);
        }
    }

    #[test]
    fn test_from_nodes_sorts_and_densifies() {
        let root = Node::new(NodeId::from("root"), None, container());
        let mut x = Node::new(NodeId::from("x"), Some(NodeId::from("root")), markdown("x"));
        x.order = 5;
        let mut y = Node::new(NodeId::from("y"), Some(NodeId::from("root")), markdown("y"));
        y.order = 2;
        let mut z = Node::new(NodeId::from("z"), Some(NodeId::from("root")), markdown("z"));
        z.order = 2;

        let store = NodeStore::from_nodes(vec![x, root, y, z]).unwrap();
        assert_eq!(
            store.child_ids("root"),
            &[NodeId::from("y"), NodeId::from("z"), NodeId::from("x")]
        );
        assert_dense(&store, &NodeId::from("root"));
    }

    #[test]
    fn test_from_nodes_rejects_duplicate_ids() {
        let a = Node::new(NodeId::from("a"), None, container());
        let err = NodeStore::from_nodes(vec![a.clone(), a]).unwrap_err();
        assert!(matches!(err, TreeError::Integrity(_)));
    }
}
