//! Structural parser
//!
//! Parses one snapshot with `syn` and extracts the raw structural counts:
//! - Function definitions at any nesting level
//! - Function lengths (from the `fn` keyword to the closing brace)
//! - Maximum simultaneous nesting of control-flow constructs

use devmirror_shared::{AnalysisError, StructuralMetrics, round2};
use syn::visit::{self, Visit};
use syn::{Block, ExprForLoop, ExprIf, ExprLoop, ExprMatch, ExprTryBlock, ExprWhile, token};
use tracing::{debug, instrument};

/// Parser extracting structural metrics from Rust source
#[derive(Debug, Clone, Copy, Default)]
pub struct StructuralParser;

impl StructuralParser {
    pub fn new() -> Self {
        Self
    }

    /// Parse a snapshot into structural metrics
    ///
    /// A snapshot without any function is valid and yields zero counts.
    #[instrument(skip_all, fields(bytes = snapshot.len()))]
    pub fn parse(&self, snapshot: &str) -> Result<StructuralMetrics, AnalysisError> {
        let metrics = with_syntax_tree(snapshot, |syntax_tree| {
            let mut visitor = StructureVisitor::default();
            visitor.visit_file(syntax_tree);
            visitor.into_metrics()
        })?;

        debug!(
            function_count = metrics.function_count,
            max_nesting_depth = metrics.max_nesting_depth,
            "Extracted structural metrics"
        );
        Ok(metrics)
    }
}

/// Parse a snapshot and run `extract` over the tree
///
/// Span locations are kept in a thread-local source map that grows with
/// every parse. The tree is dropped and the map cleared before returning, so
/// `extract` must not let spans escape.
pub(crate) fn with_syntax_tree<T>(
    snapshot: &str,
    extract: impl FnOnce(&syn::File) -> T,
) -> Result<T, AnalysisError> {
    let outcome = match syn::parse_file(snapshot) {
        Ok(syntax_tree) => Ok(extract(&syntax_tree)),
        Err(error) => Err(syntax_error(error)),
    };
    proc_macro2::extra::invalidate_current_thread_spans();
    outcome
}

/// Convert a `syn` error into the pipeline's terminal failure
fn syntax_error(error: syn::Error) -> AnalysisError {
    let start = error.span().start();
    AnalysisError::InvalidCode {
        message: error.to_string(),
        line: (start.line > 0).then_some(start.line),
        column: (start.line > 0).then_some(start.column + 1),
    }
}

/// Walks the syntax tree, tracking function spans and control-flow depth
#[derive(Debug, Default)]
struct StructureVisitor {
    function_lengths: Vec<usize>,
    current_depth: usize,
    max_depth: usize,
}

impl StructureVisitor {
    fn record_function(&mut self, fn_token: &token::Fn, body: &Block) {
        let start_line = fn_token.span.start().line;
        let end_line = body.brace_token.span.close().end().line;
        self.function_lengths
            .push(end_line.saturating_sub(start_line) + 1);
    }

    /// Run `walk` one control-flow level deeper
    fn nested(&mut self, walk: impl FnOnce(&mut Self)) {
        self.current_depth += 1;
        self.max_depth = self.max_depth.max(self.current_depth);
        walk(self);
        self.current_depth -= 1;
    }

    fn into_metrics(self) -> StructuralMetrics {
        let function_count = self.function_lengths.len();
        let avg_function_length = if function_count == 0 {
            0.0
        } else {
            let total: usize = self.function_lengths.iter().sum();
            round2(total as f64 / function_count as f64)
        };

        StructuralMetrics {
            function_count,
            avg_function_length,
            max_nesting_depth: self.max_depth,
        }
    }
}

impl<'ast> Visit<'ast> for StructureVisitor {
    fn visit_item_fn(&mut self, node: &'ast syn::ItemFn) {
        self.record_function(&node.sig.fn_token, &node.block);
        visit::visit_item_fn(self, node);
    }

    fn visit_impl_item_fn(&mut self, node: &'ast syn::ImplItemFn) {
        self.record_function(&node.sig.fn_token, &node.block);
        visit::visit_impl_item_fn(self, node);
    }

    fn visit_trait_item_fn(&mut self, node: &'ast syn::TraitItemFn) {
        // Signatures without a default body are declarations, not definitions
        if let Some(body) = &node.default {
            self.record_function(&node.sig.fn_token, body);
        }
        visit::visit_trait_item_fn(self, node);
    }

    fn visit_expr_if(&mut self, node: &'ast ExprIf) {
        self.nested(|v| visit::visit_expr_if(v, node));
    }

    fn visit_expr_match(&mut self, node: &'ast ExprMatch) {
        self.nested(|v| visit::visit_expr_match(v, node));
    }

    fn visit_expr_for_loop(&mut self, node: &'ast ExprForLoop) {
        self.nested(|v| visit::visit_expr_for_loop(v, node));
    }

    fn visit_expr_while(&mut self, node: &'ast ExprWhile) {
        self.nested(|v| visit::visit_expr_while(v, node));
    }

    fn visit_expr_loop(&mut self, node: &'ast ExprLoop) {
        self.nested(|v| visit::visit_expr_loop(v, node));
    }

    fn visit_expr_try_block(&mut self, node: &'ast ExprTryBlock) {
        self.nested(|v| visit::visit_expr_try_block(v, node));
    }
}
