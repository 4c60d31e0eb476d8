/// A pairing heap holding its minimum at the root.
pub(crate) struct PairingHeap<T> {
    root: Option<Box<HeapNode<T>>>,
    len: usize,
}

struct HeapNode<T> {
    item: T,
    children: Vec<Box<HeapNode<T>>>,
}

impl<T: Ord> PairingHeap<T> {
    pub fn new() -> Self {
        Self { root: None, len: 0 }
    }

    pub fn push(&mut self, item: T) {
        let node = Box::new(HeapNode {
            item,
            children: vec![],
        });
        self.root = Some(match self.root.take() {
            None => node,
            Some(root) => meld(root, node),
        });
        self.len += 1;
    }

    pub fn pop(&mut self) -> Option<T> {
        let root = self.root.take()?;
        let HeapNode { item, children } = *root;
        self.root = merge_pairs(children);
        self.len -= 1;
        Some(item)
    }

    pub fn peek(&self) -> Option<&T> {
        self.root.as_ref().map(|node| &node.item)
    }

    pub fn len(&self) -> usize {
        self.len
    }
}

fn meld<T: Ord>(mut a: Box<HeapNode<T>>, mut b: Box<HeapNode<T>>) -> Box<HeapNode<T>> {
    if a.item <= b.item {
        a.children.push(b);
        a
    } else {
        b.children.push(a);
        b
    }
}

/// Two-pass merge: meld neighbours left to right, then fold the results right to left.
fn merge_pairs<T: Ord>(children: Vec<Box<HeapNode<T>>>) -> Option<Box<HeapNode<T>>> {
    let mut paired = Vec::with_capacity(children.len() / 2 + 1);
    let mut iter = children.into_iter();
    while let Some(a) = iter.next() {
        match iter.next() {
            Some(b) => paired.push(meld(a, b)),
            None => paired.push(a),
        }
    }

    let mut acc = paired.pop()?;
    while let Some(node) = paired.pop() {
        acc = meld(node, acc);
    }
    Some(acc)
}

impl<T> Drop for PairingHeap<T> {
    fn drop(&mut self) {
        // Long child chains would overflow the stack with the default recursive drop.
        let mut stack = self.root.take().into_iter().collect::<Vec<_>>();
        while let Some(mut node) = stack.pop() {
            stack.append(&mut node.children);
        }
    }
}
