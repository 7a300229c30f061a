use crate::num::{NumError, ScriptNum};
use std::fmt::Display;
use std::ops::{Deref, DerefMut};

/// Stack error type.
#[derive(Debug, Clone, Copy, Eq, PartialEq, thiserror::Error)]
pub enum StackError {
    #[error("invalid stack operation")]
    InvalidOperation,
    #[error(transparent)]
    Num(#[from] NumError),
}

/// Stack for the script execution.
pub type Stack = GenericStack<Vec<u8>>;

impl Display for Stack {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[")?;

        for (i, item) in self.data.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            if item.is_empty() {
                write!(f, "<empty>")?;
            } else {
                write!(f, "{}", hex::encode(item))?;
            }
        }

        write!(f, "]")
    }
}

type Result<T> = std::result::Result<T, StackError>;

/// A stack used for managing script execution data with various operations.
///
/// Positions passed to [`Self::top`], [`Self::remove`] and friends count from
/// the top of the stack, `0` being the topmost item.
#[derive(Debug, Default, Clone)]
pub struct GenericStack<T = Vec<u8>> {
    data: Vec<T>,
    verify_minimaldata: bool,
}

impl<T: PartialEq> PartialEq for GenericStack<T> {
    fn eq(&self, other: &Self) -> bool {
        self.data == other.data
    }
}

impl<T> From<Vec<T>> for GenericStack<T> {
    fn from(data: Vec<T>) -> Self {
        Self {
            data,
            verify_minimaldata: false,
        }
    }
}

impl<T> Deref for GenericStack<T> {
    type Target = Vec<T>;

    fn deref(&self) -> &Self::Target {
        &self.data
    }
}

impl<T> DerefMut for GenericStack<T> {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.data
    }
}

impl<T> GenericStack<T> {
    #[inline]
    pub fn new(data: Vec<T>, verify_minimaldata: bool) -> Self {
        Self {
            data,
            verify_minimaldata,
        }
    }

    /// Explicitly an empty stack, [].
    pub fn empty() -> Self {
        Self {
            data: Vec::new(),
            verify_minimaldata: false,
        }
    }

    /// Sets whether numeric operands must be minimally encoded.
    pub fn set_verify_minimaldata(&mut self, verify_minimaldata: bool) {
        self.verify_minimaldata = verify_minimaldata;
    }

    pub fn verify_minimaldata(&self) -> bool {
        self.verify_minimaldata
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn into_inner(self) -> Vec<T> {
        self.data
    }

    /// Ensure there are at least `len` elements on the stack.
    #[inline]
    pub fn require(&self, len: usize) -> Result<()> {
        if self.data.len() < len {
            return Err(StackError::InvalidOperation);
        }
        Ok(())
    }

    /// Returns the last element of the stack.
    #[inline]
    pub fn last(&self) -> Result<&T> {
        self.data.last().ok_or(StackError::InvalidOperation)
    }

    /// Removes and returns the last element of the stack.
    #[inline]
    pub fn pop(&mut self) -> Result<T> {
        self.data.pop().ok_or(StackError::InvalidOperation)
    }

    /// Pops a number from the stack and converts it into a ScriptNum.
    #[inline]
    pub fn pop_num(&mut self) -> Result<ScriptNum>
    where
        T: AsRef<[u8]>,
    {
        ScriptNum::from_bytes(self.pop()?.as_ref(), self.verify_minimaldata, None)
            .map_err(Into::into)
    }

    /// Decodes the item at position `i` as a number without removing it.
    #[inline]
    pub fn top_num(&self, i: usize, max_size: usize) -> Result<ScriptNum>
    where
        T: AsRef<[u8]>,
    {
        ScriptNum::from_bytes(self.top(i)?.as_ref(), self.verify_minimaldata, Some(max_size))
            .map_err(Into::into)
    }

    /// Push an element onto the stack.
    #[inline]
    pub fn push(&mut self, value: T) -> &mut Self {
        self.data.push(value);
        self
    }

    /// Returns the element at the specified position from the top of the stack.
    ///
    /// `self.top(0)` is equivalent to `self.last()`.
    #[inline]
    pub fn top(&self, i: usize) -> Result<&T> {
        let pos = i + 1;
        self.require(pos)?;
        Ok(&self.data[self.data.len() - pos])
    }

    /// Peeks the top element and converts it to a boolean.
    #[inline]
    pub fn peek_bool(&self) -> Result<bool>
    where
        T: AsRef<[u8]>,
    {
        Ok(cast_to_bool(self.last()?.as_ref()))
    }

    /// Removes the element at the given position.
    #[inline]
    pub fn remove(&mut self, i: usize) -> Result<T> {
        let pos = i + 1;
        self.require(pos)?;
        let to_remove = self.data.len() - pos;
        Ok(self.data.remove(to_remove))
    }

    /// Removes the top `n` stack items.
    #[inline]
    pub fn drop(&mut self, n: usize) -> Result<()> {
        self.require(n)?;
        let len = self.data.len();
        self.data.truncate(len - n);
        Ok(())
    }

    /// Duplicates the top N items on the stack.
    ///
    /// dup(1): [x1 x2] -> [x1 x2 x2]
    /// dup(2): [x1 x2] -> [x1 x2 x1 x2]
    #[inline]
    pub fn dup(&mut self, n: usize) -> Result<()>
    where
        T: Clone,
    {
        self.require(n)?;
        let len = self.data.len();
        self.data.extend_from_within(len - n..);
        Ok(())
    }

    /// Copies N items N items back to the top of the stack.
    ///
    /// over(1): [... x1 x2 x3] -> [... x1 x2 x3 x2]
    /// over(2): [... x1 x2 x3 x4] -> [... x1 x2 x3 x4 x1 x2]
    #[inline]
    pub fn over(&mut self, n: usize) -> Result<()>
    where
        T: Clone,
    {
        let count = n * 2;
        self.require(count)?;
        let len = self.data.len();
        self.data.extend_from_within(len - count..len - count + n);
        Ok(())
    }

    /// Rotates the top 3N items on the stack to the left N times.
    ///
    /// - rot(1): [x1 x2 x3] -> [x2 x3 x1]
    /// - rot(2): [x1 x2 x3 x4 x5 x6] -> [x3 x4 x5 x6 x1 x2]
    #[inline]
    pub fn rot(&mut self, n: usize) -> Result<()> {
        let count = n * 3;
        self.require(count)?;
        let len = self.data.len();
        self.data[len - count..].rotate_left(n);
        Ok(())
    }

    /// Swaps the top N items on the stack with those below them.
    ///
    /// - swap(1): [x1 x2] -> [x2 x1]
    /// - swap(2): [x1 x2 x3 x4] -> [x3 x4 x1 x2]
    #[inline]
    pub fn swap(&mut self, n: usize) -> Result<()> {
        let count = n * 2;
        self.require(count)?;
        let len = self.data.len();
        let (lower, upper) = self.data.split_at_mut(len - count + n);
        lower[len - count..].swap_with_slice(&mut upper[..n]);
        Ok(())
    }

    /// Removes the second-to-top stack item.
    ///
    /// nip: [x1 x2 x3] -> [x1 x3]
    #[inline]
    pub fn nip(&mut self) -> Result<()> {
        self.require(2)?;
        let len = self.data.len();
        self.data.swap_remove(len - 2);
        Ok(())
    }

    /// Copies the item at the top of the stack and inserts it before the 2nd
    /// to top item.
    ///
    /// tuck: [... x1 x2] -> [... x2 x1 x2]
    #[inline]
    pub fn tuck(&mut self) -> Result<()>
    where
        T: Clone,
    {
        self.require(2)?;
        let len = self.data.len();
        let v = self.data[len - 1].clone();
        self.data.insert(len - 2, v);
        Ok(())
    }
}

impl Stack {
    #[inline]
    pub fn push_num(&mut self, num: impl Into<ScriptNum>) -> &mut Self {
        self.push(num.into().to_bytes());
        self
    }

    #[inline]
    pub fn push_bool(&mut self, boolean: bool) -> &mut Self {
        if boolean {
            self.push(vec![1]);
        } else {
            self.push(Vec::new());
        }
        self
    }
}

/// Converts a byte slice to a boolean.
///
/// Any non-zero byte makes the value true, except for a trailing `0x80` with
/// all other bytes zero, which is negative zero.
pub fn cast_to_bool(data: &[u8]) -> bool {
    match data.split_last() {
        Some((&last, rest)) => rest.iter().any(|&x| x != 0) || (last != 0 && last != 0x80),
        None => false,
    }
}
