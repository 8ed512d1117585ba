/// Every assignment of `arity` booleans, counting up in binary with the first column as the most significant bit.
pub(crate) fn enumerate_inputs(arity: usize) -> impl Iterator<Item = Vec<bool>> {
    (0..1usize << arity).map(move |row| (0..arity).map(|column| (row >> (arity - 1 - column)) & 1 == 1).collect())
}

#[cfg(test)]
mod test {
    #[test]
    fn enumerate_inputs() {
        assert_eq!(super::enumerate_inputs(0).collect::<Vec<_>>(), vec![Vec::<bool>::new()]);
        assert_eq!(super::enumerate_inputs(2).collect::<Vec<_>>(), vec![vec![false, false], vec![false, true], vec![true, false], vec![true, true]]);
        assert_eq!(
            super::enumerate_inputs(3).collect::<Vec<_>>(),
            vec![
                vec![false, false, false],
                vec![false, false, true],
                vec![false, true, false],
                vec![false, true, true],
                vec![true, false, false],
                vec![true, false, true],
                vec![true, true, false],
                vec![true, true, true]
            ]
        );
    }
}
