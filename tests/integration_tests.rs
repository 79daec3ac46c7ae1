//! Integration tests for uct-rust
//!
//! These exercise the search through the public API only: tree invariants
//! after real searches, determinism under a fixed seed, and the tic-tac-toe
//! scenarios the engine is expected to get right.

use uct_rust::board::TicTacToe;
use uct_rust::game::{GameState, Player};
use uct_rust::mcts::{SearchError, tree_search, uct_search};
use uct_rust::tree::{NodeId, Tree};

// =============================================================================
// Helper functions
// =============================================================================

fn board(layout: &str) -> TicTacToe {
    layout.parse().expect("valid board layout")
}

/// Grow a fresh tree from `state` with a fixed seed.
fn searched_tree(state: &TicTacToe, iterations: u32, seed: u64) -> (Tree<usize>, usize) {
    let mut tree = Tree::new(state);
    let mut rng = fastrand::Rng::with_seed(seed);
    let mv = tree_search(&mut tree, state, iterations, &mut rng).expect("search succeeds");
    (tree, mv)
}

/// Legal move count of the position each node stands for, found by replaying
/// the moves from the root.
fn legal_count_at(tree: &Tree<usize>, root_state: &TicTacToe, id: NodeId) -> usize {
    let mut path = Vec::new();
    let mut current = Some(id);
    while let Some(node_id) = current {
        let node = tree.get(node_id);
        if let Some(mv) = node.mv {
            path.push(mv);
        }
        current = node.parent;
    }

    let mut state = root_state.clone();
    for mv in path.into_iter().rev() {
        state.apply_move(mv).expect("tree only holds legal moves");
    }
    state.legal_moves().len()
}

// =============================================================================
// Tree invariants
// =============================================================================

#[test]
fn test_root_visits_equal_iterations() {
    for iterations in [1, 7, 100, 1000] {
        let (tree, _) = searched_tree(&TicTacToe::new(), iterations, 3);
        assert_eq!(tree.get(tree.root()).visits, iterations);
    }
}

#[test]
fn test_win_rates_stay_in_unit_interval() {
    let (tree, _) = searched_tree(&TicTacToe::new(), 2000, 5);
    for node in tree.nodes() {
        if node.visits > 0 {
            let rate = node.wins / node.visits as f64;
            assert!((0.0..=1.0).contains(&rate), "win rate {rate}");
        }
    }
}

#[test]
fn test_every_node_visited_and_parent_dominates_children() {
    let (tree, _) = searched_tree(&board("X../.O./..."), 1500, 8);
    for (i, node) in tree.nodes().iter().enumerate() {
        assert!(node.visits >= 1, "node {i} created without a visit");
        let max_child = tree
            .children(NodeId(i as u32))
            .map(|(_, c)| c.visits)
            .max()
            .unwrap_or(0);
        assert!(node.visits >= max_child);
    }
}

#[test]
fn test_untried_and_children_partition_legal_moves() {
    let root_state = TicTacToe::new();
    let (tree, _) = searched_tree(&root_state, 800, 13);

    for i in 0..tree.len() {
        let id = NodeId(i as u32);
        let node = tree.get(id);
        let child_moves: Vec<usize> = tree.children(id).filter_map(|(_, c)| c.mv).collect();

        for mv in &child_moves {
            assert!(!node.untried.contains(mv), "move {mv} both tried and untried");
        }
        assert_eq!(
            node.untried.len() + child_moves.len(),
            legal_count_at(&tree, &root_state, id)
        );
    }
}

#[test]
fn test_expansion_is_monotonic_across_searches() {
    let root_state = TicTacToe::new();
    let mut tree = Tree::new(&root_state);
    let mut rng = fastrand::Rng::with_seed(21);

    let mut previous: Vec<(usize, usize)> = Vec::new();
    for _ in 0..30 {
        tree_search(&mut tree, &root_state, 10, &mut rng).unwrap();
        let sizes: Vec<(usize, usize)> = tree
            .nodes()
            .iter()
            .map(|n| (n.untried.len(), n.children.len()))
            .collect();

        // Existing nodes keep their total and only lose untried moves.
        for (old, new) in previous.iter().zip(&sizes) {
            assert_eq!(old.0 + old.1, new.0 + new.1);
            assert!(new.0 <= old.0);
        }
        previous = sizes;
    }
    assert_eq!(tree.get(tree.root()).visits, 300);
}

#[test]
fn test_root_has_no_move_or_parent() {
    let (tree, _) = searched_tree(&TicTacToe::new(), 50, 1);
    let root = tree.get(tree.root());
    assert!(root.mv.is_none());
    assert!(root.parent.is_none());
    for node in &tree.nodes()[1..] {
        assert!(node.mv.is_some());
        assert!(node.parent.is_some());
    }
}

// =============================================================================
// Determinism
// =============================================================================

#[test]
fn test_same_seed_same_tree_and_move() {
    let state = board("X../.../..O");
    let (tree_a, mv_a) = searched_tree(&state, 600, 77);
    let (tree_b, mv_b) = searched_tree(&state, 600, 77);

    assert_eq!(mv_a, mv_b);
    assert_eq!(tree_a.len(), tree_b.len());
    assert_eq!(tree_a.to_tree_string(), tree_b.to_tree_string());
}

#[test]
fn test_uct_search_matches_tree_search() {
    let state = TicTacToe::new();
    let mut rng = fastrand::Rng::with_seed(31);
    let direct = uct_search(&state, 300, &mut rng).unwrap();
    let (_, via_tree) = searched_tree(&state, 300, 31);
    assert_eq!(direct, via_tree);
}

// =============================================================================
// Terminal positions and preconditions
// =============================================================================

#[test]
fn test_terminal_win_scoring() {
    let won = board("OOO/XX./X..");
    assert!(won.is_terminal());
    assert_eq!(won.winner(), Some(Player::Two));
    assert_eq!(won.result(Player::Two), 1.0);
    assert_eq!(won.result(Player::One), 0.0);
}

#[test]
fn test_full_board_draw_scoring() {
    let drawn = board("XOX/OOX/XXO");
    assert!(drawn.is_terminal());
    assert_eq!(drawn.winner(), None);
    assert_eq!(drawn.result(Player::One), 0.5);
    assert_eq!(drawn.result(Player::Two), 0.5);
}

#[test]
fn test_full_board_rejected_by_search() {
    let full = board("XOX/OOX/XXO");
    assert!(full.legal_moves().is_empty());

    let mut rng = fastrand::Rng::with_seed(0);
    assert!(matches!(
        uct_search(&full, 100, &mut rng),
        Err(SearchError::NoLegalMoves)
    ));
}

#[test]
fn test_clone_is_independent() {
    let state = board("X../.O./...");
    let snapshot = state.clone();

    let mut copy = state.clone();
    copy.apply_move(8).unwrap();

    assert_eq!(state, snapshot);
    assert_ne!(copy, state);
    assert_eq!(state.legal_moves().len(), 7);
}

// =============================================================================
// Scenarios
// =============================================================================

#[test]
fn test_forced_win_child_has_best_win_rate() {
    // X to move; cell 2 completes the top row.
    let state = board("XX./OO./...");
    let (tree, _) = searched_tree(&state, 50, 4);

    let children: Vec<_> = tree.children(tree.root()).map(|(_, c)| c).collect();
    let winning = children
        .iter()
        .find(|c| c.mv == Some(2))
        .expect("winning move expanded");

    assert!(winning.visits >= 1);
    assert_eq!(winning.win_rate(), 1.0);
    for child in &children {
        assert!(child.win_rate() <= winning.win_rate());
    }
}

#[test]
fn test_forced_win_is_returned() {
    let state = board("XX./OO./...");
    for seed in 0..5 {
        let (_, mv) = searched_tree(&state, 300, seed);
        assert_eq!(mv, 2, "seed {seed}");
    }
}

#[test]
fn test_larger_board_search() {
    let state = TicTacToe::with_size(4).unwrap();
    let (tree, mv) = searched_tree(&state, 400, 9);
    assert!(mv < 16);
    assert_eq!(tree.get(tree.root()).visits, 400);
    assert!(tree.get(tree.root()).untried.is_empty());
}
