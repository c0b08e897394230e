//! Recursive minimax with alpha-beta pruning
//!
//! The path set holds every `(state, turn)` on the current line. It is
//! pushed on entry and popped on exit of each frame, so siblings never see
//! each other's positions. Re-entering a position on the path returns its
//! static score tagged [`Outcome::Loop`] instead of recursing.
//!
//! Every expanded node and every loop hit is recorded in `visited`, and each
//! memo entry keeps the nodes of its own subtree. An entry is reused only
//! when that set misses the current path, so a reused value never hides a
//! loop the plain search would have found.

use super::ordering::order_moves;
use super::{NodeValue, Searcher};
use crate::constants::WIN_SCORE;
use crate::evaluation::terminal_score;
use crate::hash::{Bound, MemoEntry, MemoKey};
use crate::move_gen::{apply_move, legal_moves};
use crate::types::{GameState, Move, Outcome, Side};

impl NodeValue {
    /// Value seen from the parent that played `mv` to reach this node
    pub(crate) fn extend(self, mv: Move, keep_line: bool) -> NodeValue {
        let mut line = Vec::with_capacity(if keep_line { self.line.len() + 1 } else { 1 });
        line.push(mv);
        if keep_line {
            line.extend(self.line);
        }
        NodeValue {
            score: self.score,
            outcome: self.outcome,
            steps: self.steps + 1,
            line,
        }
    }
}

impl<'e> Searcher<'e> {
    pub(crate) fn search(
        &mut self,
        state: GameState,
        depth: u32,
        turn: Side,
        mut alpha: i64,
        mut beta: i64,
    ) -> NodeValue {
        self.stats.nodes += 1;

        if let Some(score) = terminal_score(&state, self.perspective, depth) {
            let outcome = if score > 0 { Outcome::Win } else { Outcome::Lose };
            return NodeValue::leaf(score, outcome);
        }

        if depth == 0 {
            let score = self.evaluator.evaluate(&state, self.perspective);
            return NodeValue::leaf(score, Outcome::Draw);
        }

        let path_key = (state.key(), turn);
        if self.path.contains(&path_key) {
            self.stats.loop_hits += 1;
            self.visited.insert(path_key);
            let score = self.evaluator.evaluate(&state, self.perspective);
            return NodeValue::leaf(score, Outcome::Loop);
        }

        let memo_key = MemoKey {
            state: path_key.0,
            turn,
            depth,
            root: self.perspective,
        };
        if let Some(entry) = self.memo.probe(&memo_key) {
            if entry.usable(alpha, beta) && entry.path_safe(&self.path) {
                self.stats.memo_hits += 1;
                self.visited.union_with(&entry.visited);
                return NodeValue {
                    score: entry.score,
                    outcome: entry.outcome,
                    steps: entry.steps,
                    line: entry.line.clone(),
                };
            }
        }

        let mut moves = legal_moves(&state, turn);
        if moves.is_empty() {
            // Side to move is stuck: that side has lost
            let scale = depth as i64 + 1;
            return if turn == self.perspective {
                NodeValue::leaf(-WIN_SCORE * scale, Outcome::Lose)
            } else {
                NodeValue::leaf(WIN_SCORE * scale, Outcome::Win)
            };
        }
        if self.options.order_moves {
            order_moves(&state, turn, &mut moves, self.evaluator);
        }

        let maximizing = turn == self.perspective;
        let (alpha_in, beta_in) = (alpha, beta);
        let loops_before = self.stats.loop_hits;
        let keep_line = self.options.track_line;
        let mut best: Option<NodeValue> = None;

        let outer = std::mem::take(&mut self.visited);
        self.path.insert(path_key);
        for mv in moves {
            let child_state = apply_move(state, turn, mv);
            let child = self.search(child_state, depth - 1, turn.opponent(), alpha, beta);
            let score = child.score;

            let improves = match &best {
                None => true,
                Some(current) if maximizing => score > current.score,
                Some(current) => score < current.score,
            };
            if improves {
                best = Some(child.extend(mv, keep_line));
            }

            if maximizing {
                alpha = alpha.max(score);
            } else {
                beta = beta.min(score);
            }
            if beta <= alpha {
                self.stats.cutoffs += 1;
                break;
            }
        }
        self.path.remove(&path_key);

        let mut subtree = std::mem::replace(&mut self.visited, outer);
        subtree.insert(path_key);
        self.visited.union_with(&subtree);

        let Some(best) = best else {
            let score = self.evaluator.evaluate(&state, self.perspective);
            return NodeValue::leaf(score, Outcome::Draw);
        };

        // Loop-tainted values depend on the path that reached them
        if self.stats.loop_hits == loops_before {
            let bound = if best.score <= alpha_in {
                Bound::Upper
            } else if best.score >= beta_in {
                Bound::Lower
            } else {
                Bound::Exact
            };
            self.memo.store(
                memo_key,
                MemoEntry {
                    score: best.score,
                    bound,
                    outcome: best.outcome,
                    steps: best.steps,
                    line: best.line.clone(),
                    visited: subtree,
                },
            );
        }

        best
    }
}

#[cfg(test)]
mod tests {
    use super::super::SearchOptions;
    use super::*;
    use crate::constants::SCORE_INF;
    use crate::evaluation::{Evaluator, TacticalEvaluator};
    use crate::types::Outcome;

    /// Plain minimax without pruning, memo or loop detection beyond a path set
    fn reference_minimax(
        state: GameState,
        depth: u32,
        turn: Side,
        perspective: Side,
        path: &mut Vec<(crate::types::StateKey, Side)>,
    ) -> i64 {
        let evaluator = TacticalEvaluator::default();
        if let Some(score) = terminal_score(&state, perspective, depth) {
            return score;
        }
        if depth == 0 || path.contains(&(state.key(), turn)) {
            return evaluator.evaluate(&state, perspective);
        }
        path.push((state.key(), turn));
        let scores = legal_moves(&state, turn)
            .into_iter()
            .map(|mv| {
                reference_minimax(apply_move(state, turn, mv), depth - 1, turn.opponent(), perspective, path)
            })
            .collect::<Vec<_>>();
        path.pop();
        if turn == perspective {
            scores.into_iter().max().unwrap_or(0)
        } else {
            scores.into_iter().min().unwrap_or(0)
        }
    }

    /// Every position that is still being played
    fn open_positions() -> Vec<GameState> {
        let mut states = Vec::new();
        for p0 in 0..5 {
            for p1 in 0..5 {
                for c0 in 0..5 {
                    for c1 in 0..5 {
                        let state = GameState::new([p0, p1], [c0, c1]).unwrap();
                        if !state.is_terminal() {
                            states.push(state);
                        }
                    }
                }
            }
        }
        states
    }

    #[test]
    fn test_alphabeta_matches_plain_minimax_at_low_depth() {
        let evaluator = TacticalEvaluator::default();
        let states = [
            GameState::initial(),
            GameState::new([2, 3], [1, 4]).unwrap(),
            GameState::new([0, 4], [3, 3]).unwrap(),
            GameState::new([1, 2], [0, 2]).unwrap(),
        ];
        for state in states {
            for depth in 1..=3 {
                let mut searcher = Searcher::new(Side::Cpu, SearchOptions::SELECTOR, &evaluator);
                let value = searcher.search(state, depth, Side::Cpu, -SCORE_INF, SCORE_INF);
                let expected = reference_minimax(state, depth, Side::Cpu, Side::Cpu, &mut Vec::new());
                assert_eq!(value.score, expected, "state {} depth {}", state, depth);
            }
        }
    }

    #[test]
    fn test_memo_reuse_matches_plain_minimax_everywhere() {
        // Depth 7 reaches transpositions whose subtrees cross the current path
        let evaluator = TacticalEvaluator::default();
        let mut mismatches = Vec::new();
        for state in open_positions() {
            for depth in [5, 7] {
                let mut searcher = Searcher::new(Side::Cpu, SearchOptions::SELECTOR, &evaluator);
                let value = searcher.search(state, depth, Side::Cpu, -SCORE_INF, SCORE_INF);
                let expected = reference_minimax(state, depth, Side::Cpu, Side::Cpu, &mut Vec::new());
                if value.score != expected {
                    mismatches.push((state, depth, value.score, expected));
                }
            }
        }
        assert!(mismatches.is_empty(), "mismatches: {:?}", mismatches);
    }

    #[test]
    fn test_entry_crossing_current_path_is_not_reused() {
        let evaluator = TacticalEvaluator::default();
        let state = GameState::new([2, 3], [1, 4]).unwrap();
        let mut searcher = Searcher::new(Side::Cpu, SearchOptions::SELECTOR, &evaluator);
        // No line of three plies from here repeats a position, so the root is stored
        searcher.search(state, 3, Side::Cpu, -SCORE_INF, SCORE_INF);

        let child = legal_moves(&state, Side::Cpu)
            .into_iter()
            .map(|mv| apply_move(state, Side::Cpu, mv))
            .find(|next| !next.is_terminal())
            .unwrap();
        let child_node = (child.key(), Side::Player);
        let root_key = MemoKey {
            state: state.key(),
            turn: Side::Cpu,
            depth: 3,
            root: Side::Cpu,
        };
        let entry = searcher.memo.probe(&root_key).unwrap();
        assert!(entry.visited.contains(&child_node));

        // With the child on the path, the stored root value no longer applies
        searcher.path.insert(child_node);
        assert!(!searcher.memo.probe(&root_key).unwrap().path_safe(&searcher.path));
        let value = searcher.search(state, 3, Side::Cpu, -SCORE_INF, SCORE_INF);
        let expected = reference_minimax(state, 3, Side::Cpu, Side::Cpu, &mut vec![child_node]);
        assert_eq!(value.score, expected);
    }

    #[test]
    fn test_repeated_position_is_tagged_loop() {
        let evaluator = TacticalEvaluator::default();
        let mut searcher = Searcher::new(Side::Player, SearchOptions::SELECTOR, &evaluator);
        let state = GameState::new([2, 2], [3, 3]).unwrap();
        searcher.path.insert((state.key(), Side::Player));
        let value = searcher.search(state, 5, Side::Player, -SCORE_INF, SCORE_INF);
        assert_eq!(value.outcome, Outcome::Loop);
        assert_eq!(value.score, evaluator.evaluate(&state, Side::Player));
        assert_eq!(searcher.stats().loop_hits, 1);
    }

    #[test]
    fn test_path_is_empty_after_search() {
        let evaluator = TacticalEvaluator::default();
        let mut searcher = Searcher::new(Side::Cpu, SearchOptions::HINT, &evaluator);
        searcher.search(GameState::initial(), 6, Side::Cpu, -SCORE_INF, SCORE_INF);
        assert!(searcher.path.is_empty());
        assert!(searcher.visited.contains(&(GameState::initial().key(), Side::Cpu)));
    }

    #[test]
    fn test_terminal_state_short_circuits() {
        let evaluator = TacticalEvaluator::default();
        let mut searcher = Searcher::new(Side::Cpu, SearchOptions::SELECTOR, &evaluator);
        let lost = GameState::new([0, 0], [1, 2]).unwrap();
        let value = searcher.search(lost, 3, Side::Player, -SCORE_INF, SCORE_INF);
        assert_eq!(value.outcome, Outcome::Win);
        assert_eq!(value.score, WIN_SCORE * 4);
        assert_eq!(searcher.stats().nodes, 1);
    }
}
