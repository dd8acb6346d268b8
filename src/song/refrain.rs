// Copyright (c) 2026 Robert L. Snyder, Sierra Vista, AZ
// Licensed under the MIT License. See LICENSE file in the project root for details.

//! Refrain insertion.
//!
//! The refrain is the second block of a song. When the first block is a
//! split head, its continuation occupies the second slot and the refrain
//! is the split pair that follows. A copy of the refrain is placed after
//! every block that is neither part of the refrain nor already followed by
//! a refrain block. Split heads never get a copy, since their continuation
//! must stay next to them. Blocks are compared by text.

use super::block::Block;

/// Blocks that make up the refrain, in order.
///
/// Empty when the song is too short to have one.
pub fn refrain_of(blocks: &[Block]) -> Vec<Block> {
    match blocks.first() {
        Some(first) if first.is_split_head() => {
            if blocks.len() > 3 {
                blocks[2..4].to_vec()
            } else {
                Vec::new()
            }
        }
        Some(_) if blocks.len() > 1 => vec![blocks[1].clone()],
        _ => Vec::new(),
    }
}

/// Insert refrain copies. Returns the number of copies inserted.
pub fn insert_refrain(blocks: &mut Vec<Block>) -> usize {
    let refrain = refrain_of(blocks);
    if refrain.is_empty() {
        return 0;
    }

    let in_refrain = |block: &Block| refrain.iter().any(|r| r.text() == block.text());

    let mut inserted = 0;
    let mut out = Vec::with_capacity(blocks.len() * 2);
    let mut iter = blocks.drain(..).peekable();
    while let Some(block) = iter.next() {
        let needs_refrain = !block.is_split_head()
            && !in_refrain(&block)
            && !iter.peek().is_some_and(|next| in_refrain(next));
        out.push(block);
        if needs_refrain {
            out.extend(refrain.iter().cloned());
            inserted += 1;
        }
    }
    drop(iter);

    *blocks = out;
    inserted
}
