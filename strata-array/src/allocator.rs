/// Grow `buffer` so that it holds at least `size` elements.
///
/// Buffers are never shrunk, so a producer that calls this once per batch stops allocating as
/// soon as it has seen its largest batch.
#[inline]
pub fn allocate_to_size<T: Clone + Default>(buffer: &mut Vec<T>, size: usize) {
    if buffer.len() < size {
        buffer.resize(size, T::default());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn grows_but_never_shrinks() {
        let mut buffer: Vec<u32> = Vec::new();
        allocate_to_size(&mut buffer, 4);
        assert_eq!(buffer.len(), 4);

        buffer[3] = 9;
        allocate_to_size(&mut buffer, 2);
        assert_eq!(buffer, vec![0, 0, 0, 9]);

        allocate_to_size(&mut buffer, 6);
        assert_eq!(buffer.len(), 6);
    }
}
