//! LZ77 match finding with hash chains.

/// Shortest back-reference DEFLATE can express.
pub(crate) const MIN_MATCH: usize = 3;
/// Longest back-reference DEFLATE can express.
pub(crate) const MAX_MATCH: usize = 258;
/// Largest back-reference distance.
pub(crate) const WINDOW_SIZE: usize = 32768;

const WINDOW_MASK: usize = WINDOW_SIZE - 1;
const HASH_BITS: u32 = 15;
const HASH_SIZE: usize = 1 << HASH_BITS;
const NIL: usize = usize::MAX;

/// One LZ77 symbol.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum Token {
    Literal(u8),
    /// Copy `length` bytes starting `distance` bytes back.
    Match { length: u16, distance: u16 },
}

impl Token {
    /// Number of input bytes this token stands for.
    pub(crate) fn len(&self) -> usize {
        match *self {
            Token::Literal(_) => 1,
            Token::Match { length, .. } => usize::from(length),
        }
    }
}

/// How hard the match finder works.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) struct SearchParams {
    /// Chain links followed per position before settling for the best match so far.
    pub(crate) max_chain: usize,
    /// A match at least this long ends the search early.
    pub(crate) nice_length: usize,
}

/// Greedy hash chain match finder over a single input buffer.
///
/// `head` maps a hash of the next three bytes to the most recent position with that hash, `prev`
/// links every position in the window to the previous one with the same hash. Chains are walked
/// from the nearest candidate outwards, so among equally long matches the smallest distance wins.
pub(crate) struct MatchFinder<'a> {
    data: &'a [u8],
    pos: usize,
    head: Vec<usize>,
    prev: Vec<usize>,
    params: SearchParams,
}

impl<'a> MatchFinder<'a> {
    pub(crate) fn new(data: &'a [u8], params: SearchParams) -> Self {
        MatchFinder {
            data,
            pos: 0,
            head: vec![NIL; HASH_SIZE],
            prev: vec![NIL; WINDOW_SIZE],
            params,
        }
    }

    /// Input position of the next token.
    pub(crate) fn position(&self) -> usize {
        self.pos
    }

    #[inline]
    fn hash(&self, pos: usize) -> usize {
        let d = &self.data[pos..pos + MIN_MATCH];
        let key = u32::from(d[0]) << 16 | u32::from(d[1]) << 8 | u32::from(d[2]);
        (key.wrapping_mul(0x9E37_79B1) >> (32 - HASH_BITS)) as usize
    }

    #[inline]
    fn insert(&mut self, pos: usize) {
        if pos + MIN_MATCH > self.data.len() {
            return;
        }
        let h = self.hash(pos);
        self.prev[pos & WINDOW_MASK] = self.head[h];
        self.head[h] = pos;
    }

    /// Longest earlier occurrence of the bytes at `pos`, as `(length, distance)`.
    fn longest_match(&self, pos: usize) -> Option<(usize, usize)> {
        let max_len = MAX_MATCH.min(self.data.len() - pos);
        if max_len < MIN_MATCH {
            return None;
        }

        let current = &self.data[pos..pos + max_len];
        let mut best_len = MIN_MATCH - 1;
        let mut best_dist = 0;
        let mut candidate = self.head[self.hash(pos)];
        let mut chain = self.params.max_chain;

        while candidate != NIL && chain > 0 {
            let distance = pos - candidate;
            if distance > WINDOW_SIZE {
                break;
            }

            let earlier = &self.data[candidate..candidate + max_len];
            // Only a candidate that also matches one byte past the current best can improve it.
            if earlier[best_len] == current[best_len] {
                let len = earlier
                    .iter()
                    .zip(current)
                    .take_while(|(a, b)| a == b)
                    .count();
                if len > best_len {
                    best_len = len;
                    best_dist = distance;
                    if len >= self.params.nice_length || len == max_len {
                        break;
                    }
                }
            }

            let next = self.prev[candidate & WINDOW_MASK];
            // A link to a later position means the slot was reused; the chain ends here.
            if next == NIL || next >= candidate {
                break;
            }
            candidate = next;
            chain -= 1;
        }

        (best_len >= MIN_MATCH).then_some((best_len, best_dist))
    }
}

impl Iterator for MatchFinder<'_> {
    type Item = Token;

    fn next(&mut self) -> Option<Token> {
        let pos = self.pos;
        let &byte = self.data.get(pos)?;

        let token = match self.longest_match(pos) {
            // Both values are bounded by MAX_MATCH and WINDOW_SIZE, which fit a u16.
            Some((length, distance)) => Token::Match {
                length: length as u16,
                distance: distance as u16,
            },
            None => Token::Literal(byte),
        };

        let end = pos + token.len();
        for p in pos..end {
            self.insert(p);
        }
        self.pos = end;

        Some(token)
    }
}
