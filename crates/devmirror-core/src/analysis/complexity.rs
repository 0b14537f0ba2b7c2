//! Cyclomatic complexity estimation
//!
//! Re-parses the snapshot independently of the structural parser and scores
//! every function-like block with the decision-point formula. This stage never
//! fails: an unparseable snapshot or one without blocks scores 0.

use super::parser::with_syntax_tree;
use devmirror_shared::{AnalysisError, ComplexityMetrics, round2};
use syn::visit::{self, Visit};
use syn::{BinOp, Block, ExprBinary, ExprForLoop, ExprIf, ExprLoop, ExprMatch, ExprTry, ExprWhile, Item};
use tracing::{debug, instrument};

/// Complexity of one function-like block
#[derive(Debug, Clone, PartialEq)]
pub struct BlockComplexity {
    pub name: String,
    pub complexity: u32,
}

/// Decision-point complexity estimator
#[derive(Debug, Clone, Copy, Default)]
pub struct ComplexityEstimator;

impl ComplexityEstimator {
    pub fn new() -> Self {
        Self
    }

    /// Mean complexity across all blocks, rounded to two decimals
    #[instrument(skip_all, fields(bytes = snapshot.len()))]
    pub fn estimate(&self, snapshot: &str) -> ComplexityMetrics {
        let blocks = match self.blocks(snapshot) {
            Ok(blocks) => blocks,
            Err(e) => {
                debug!("Complexity analysis degraded to 0: {}", e);
                return ComplexityMetrics::default();
            }
        };

        if blocks.is_empty() {
            debug!("No function blocks found, complexity is 0");
            return ComplexityMetrics::default();
        }

        let total: u32 = blocks.iter().map(|b| b.complexity).sum();
        ComplexityMetrics {
            cyclomatic_complexity: round2(f64::from(total) / blocks.len() as f64),
        }
    }

    /// Per-block complexity in source order
    pub fn blocks(&self, snapshot: &str) -> Result<Vec<BlockComplexity>, AnalysisError> {
        with_syntax_tree(snapshot, |syntax_tree| {
            let mut collector = BlockCollector::default();
            collector.visit_file(syntax_tree);
            collector.blocks
        })
    }
}

/// Finds function-like blocks anywhere in the tree
#[derive(Debug, Default)]
struct BlockCollector {
    blocks: Vec<BlockComplexity>,
}

impl BlockCollector {
    fn score(&mut self, name: &syn::Ident, body: &Block) {
        let mut counter = DecisionCounter { decisions: 0 };
        counter.visit_block(body);

        self.blocks.push(BlockComplexity {
            name: name.to_string(),
            complexity: 1 + counter.decisions,
        });
    }
}

impl<'ast> Visit<'ast> for BlockCollector {
    fn visit_item_fn(&mut self, node: &'ast syn::ItemFn) {
        self.score(&node.sig.ident, &node.block);
        visit::visit_item_fn(self, node);
    }

    fn visit_impl_item_fn(&mut self, node: &'ast syn::ImplItemFn) {
        self.score(&node.sig.ident, &node.block);
        visit::visit_impl_item_fn(self, node);
    }

    fn visit_trait_item_fn(&mut self, node: &'ast syn::TraitItemFn) {
        if let Some(body) = &node.default {
            self.score(&node.sig.ident, body);
        }
        visit::visit_trait_item_fn(self, node);
    }
}

/// Counts decision points inside one body
///
/// Nested items are separate blocks and are skipped here.
struct DecisionCounter {
    decisions: u32,
}

impl<'ast> Visit<'ast> for DecisionCounter {
    fn visit_item(&mut self, _node: &'ast Item) {}

    fn visit_expr_if(&mut self, node: &'ast ExprIf) {
        self.decisions += 1;
        visit::visit_expr_if(self, node);
    }

    fn visit_expr_while(&mut self, node: &'ast ExprWhile) {
        self.decisions += 1;
        visit::visit_expr_while(self, node);
    }

    fn visit_expr_for_loop(&mut self, node: &'ast ExprForLoop) {
        self.decisions += 1;
        visit::visit_expr_for_loop(self, node);
    }

    fn visit_expr_loop(&mut self, node: &'ast ExprLoop) {
        self.decisions += 1;
        visit::visit_expr_loop(self, node);
    }

    fn visit_expr_match(&mut self, node: &'ast ExprMatch) {
        let arms = node.arms.len() as u32;
        let guards = node.arms.iter().filter(|arm| arm.guard.is_some()).count() as u32;
        self.decisions += arms.saturating_sub(1) + guards;
        visit::visit_expr_match(self, node);
    }

    fn visit_expr_binary(&mut self, node: &'ast ExprBinary) {
        if matches!(node.op, BinOp::And(_) | BinOp::Or(_)) {
            self.decisions += 1;
        }
        visit::visit_expr_binary(self, node);
    }

    fn visit_expr_try(&mut self, node: &'ast ExprTry) {
        self.decisions += 1;
        visit::visit_expr_try(self, node);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn estimate(code: &str) -> f64 {
        ComplexityEstimator::new().estimate(code).cyclomatic_complexity
    }

    #[test]
    fn test_straight_line_function_is_one() {
        assert_eq!(estimate("fn f() -> i32 { let a = 1; a + 1 }"), 1.0);
    }

    #[test]
    fn test_decision_points() {
        let code = r#"
fn check(values: &[i32], flag: bool) -> Result<i32, String> {
    let mut total = 0;
    for v in values {
        if *v > 0 && flag || *v < -10 {
            total += v;
        }
    }
    while total > 100 {
        total /= 2;
    }
    let parsed: i32 = "7".parse().map_err(|_| "bad".to_string())?;
    match parsed {
        0 => Ok(total),
        n if n > 5 => Ok(n),
        _ => Err("small".into()),
    }
}
"#;
        // 1 + for + if + && + || + while + ? + (3 arms - 1) + guard
        let blocks = ComplexityEstimator::new().blocks(code).unwrap();
        assert_eq!(blocks.len(), 1);
        assert_eq!(blocks[0].name, "check");
        assert_eq!(blocks[0].complexity, 10);
    }

    #[test]
    fn test_average_across_blocks() {
        let code = r#"
fn simple() {}

fn branchy(x: i32) -> i32 {
    if x > 0 { 1 } else { 0 }
}

struct S;
impl S {
    fn looping(&self) {
        loop { break; }
    }
}
"#;
        // (1 + 2 + 2) / 3
        assert_eq!(estimate(code), 1.67);
    }

    #[test]
    fn test_nested_fn_is_its_own_block() {
        let code = r#"
fn outer() {
    fn inner(x: bool) -> bool {
        if x { !x } else { x }
    }
    inner(true);
}
"#;
        let blocks = ComplexityEstimator::new().blocks(code).unwrap();
        let complexities: Vec<u32> = blocks.iter().map(|b| b.complexity).collect();
        assert_eq!(complexities, vec![1, 2]);
    }

    #[test]
    fn test_no_blocks_scores_zero() {
        assert_eq!(estimate("const A: u8 = 1;"), 0.0);
        assert_eq!(estimate(""), 0.0);
    }

    #[test]
    fn test_repeated_estimates_are_stable() {
        let code = "fn f(x: bool) -> u8 {\n    if x { 1 } else { 0 }\n}\n";
        for _ in 0..500 {
            assert_eq!(estimate(code), 2.0);
            assert_eq!(estimate("fn nope( -> {"), 0.0);
        }
    }

    #[test]
    fn test_invalid_code_scores_zero() {
        assert_eq!(estimate("fn nope( -> {"), 0.0);
    }
}
