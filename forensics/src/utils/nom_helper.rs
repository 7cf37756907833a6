/**
 * Small nom wrappers for pulling fixed width integers out of raw artifact bytes
 */
use nom::{
    bytes::complete::take,
    number::complete::{be_u32, le_u32},
};
use std::mem::size_of;

#[derive(Clone, Copy)]
pub(crate) enum Endian {
    /**Little Endian */
    Le,
    /**Big Endian */
    Be,
}

/**
 * Nom four (4) bytes to u32
 * Need to specify Endianess
 */
pub(crate) fn nom_unsigned_four_bytes(data: &[u8], endian: Endian) -> nom::IResult<&[u8], u32> {
    let (input, value_data) = take(size_of::<u32>())(data)?;

    let (_, value) = match endian {
        Endian::Le => le_u32(value_data)?,
        Endian::Be => be_u32(value_data)?,
    };

    Ok((input, value))
}

/// Every aligned four byte word in `data` as (offset, value). A trailing partial word is ignored
pub(crate) fn aligned_words(data: &[u8], endian: Endian) -> Vec<(usize, u32)> {
    let mut words = Vec::with_capacity(data.len() / size_of::<u32>());
    let mut remaining = data;
    let mut offset = 0;
    while remaining.len() >= size_of::<u32>() {
        let (input, value) = match nom_unsigned_four_bytes(remaining, endian) {
            Ok(result) => result,
            Err(_err) => break,
        };
        words.push((offset, value));
        offset += size_of::<u32>();
        remaining = input;
    }
    words
}

#[cfg(test)]
mod tests {
    use crate::utils::nom_helper::{Endian, aligned_words, nom_unsigned_four_bytes};

    #[test]
    fn test_nom_unsigned_four_bytes() {
        let test = [0, 0, 0, 2];
        let (_, results) = nom_unsigned_four_bytes(&test, Endian::Be).unwrap();
        assert_eq!(results, 2);

        let (_, results) = nom_unsigned_four_bytes(&test, Endian::Le).unwrap();
        assert_eq!(results, 0x02000000);
    }

    #[test]
    fn test_aligned_words() {
        let test = [0x00, 0xf1, 0x53, 0x65, 1, 0, 0, 0, 9, 9];
        let results = aligned_words(&test, Endian::Le);
        assert_eq!(results, vec![(0, 1700000000), (4, 1)]);
    }

    #[test]
    fn test_aligned_words_exact_fit() {
        let test = [1, 0, 0, 0];
        let results = aligned_words(&test, Endian::Le);
        assert_eq!(results, vec![(0, 1)]);
    }
}
