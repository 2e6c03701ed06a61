use crate::tensor::{RawTensor, Tensor};
use std::collections::HashSet;

// ===== GRADIENT FUNCTION TRAIT =====

/// Trait for gradient computation functions.
///
/// Each operation type implements this to define how gradients flow backward.
/// The `backward` method takes:
/// - `out_grad`: gradient of loss w.r.t. this operation's output
/// - `parents`: the input tensors to this operation
///
/// Returns: vector of gradients w.r.t. each parent, in forward-input order.
/// A `None` slot means no gradient flows to that parent - either it doesn't
/// require one, or the operation treats it as non-differentiable.
pub trait GradFn {
    /// Compute gradients for parent tensors given output gradient
    fn backward(&self, out_grad: &RawTensor, parents: &[Tensor]) -> Vec<Option<Tensor>>;
    /// Clone this gradient function (needed for Rc/RefCell)
    fn clone_box(&self) -> Box<dyn GradFn>;
}

// ===== BACKPROPAGATION =====

impl RawTensor {
    /// Run backpropagation starting from this tensor
    ///
    /// Reverse-mode automatic differentiation: seed this tensor's gradient
    /// with ones (a scalar loss), walk the graph in reverse topological order
    /// so every node is processed only after all of its consumers, and
    /// accumulate each `grad_fn`'s contributions into the parents.
    ///
    /// # Panics
    /// Calling on a tensor that doesn't require gradients
    pub fn backward(root: &Tensor) {
        assert!(
            root.borrow().requires_grad,
            "Called backward on a tensor that doesn't require grad"
        );

        {
            let mut t = root.borrow_mut();
            if t.grad.is_none() {
                t.grad = Some(vec![1.0; t.data.len()]);
            }
        }

        // Consumers must finish before producers: a plain DFS would hand a
        // node its gradient before every path reaching it ("diamond" graphs)
        // has contributed, so propagation follows a topological order.
        for node in Self::reverse_topological_order(root) {
            Self::propagate(&node);
        }
    }

    /// Collect the graph below `root` ordered root-first, parents after all
    /// of their consumers.
    ///
    /// Iterative post-order DFS (an explicit stack keeps deep graphs from
    /// overflowing the call stack); nodes are deduplicated by cell address.
    fn reverse_topological_order(root: &Tensor) -> Vec<Tensor> {
        let mut order = Vec::new();
        let mut seen = HashSet::new();
        // (node, children already expanded?)
        let mut stack = vec![(root.clone(), false)];

        while let Some((node, expanded)) = stack.pop() {
            if expanded {
                order.push(node);
                continue;
            }
            if !seen.insert(node.as_ptr()) {
                continue;
            }
            stack.push((node.clone(), true));
            for parent in &node.borrow().parents {
                stack.push((parent.clone(), false));
            }
        }

        // Post-order yields [leaf, ..., root]; propagation wants the reverse.
        order.reverse();
        order
    }

    /// Push one node's gradient through its `grad_fn` into its parents.
    fn propagate(node: &Tensor) {
        let (grad_fn, parents, grad, shape) = {
            let t = node.borrow();
            (
                t.grad_fn.as_ref().map(|gf| gf.clone_box()),
                t.parents.clone(),
                t.grad.clone(),
                t.shape.clone(),
            )
        };
        let (Some(grad_fn), Some(grad)) = (grad_fn, grad) else {
            return;
        };

        let upstream = RawTensor {
            data: grad,
            shape,
            grad: None,
            requires_grad: false,
            grad_fn: None,
            parents: vec![],
        };

        for (contribution, parent_ref) in grad_fn
            .backward(&upstream, &parents)
            .into_iter()
            .zip(&parents)
        {
            let Some(contribution) = contribution else {
                continue;
            };
            let fresh = contribution.borrow().data.clone();
            let mut parent = parent_ref.borrow_mut();
            match parent.grad {
                // First contribution: just store it.
                None => parent.grad = Some(fresh),
                Some(ref mut accumulated) => {
                    assert_eq!(
                        accumulated.len(),
                        fresh.len(),
                        "Gradient size mismatch during accumulation"
                    );
                    for (acc, add) in accumulated.iter_mut().zip(&fresh) {
                        *acc += add;
                    }
                }
            }
        }
    }
}
