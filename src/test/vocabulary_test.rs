use super::*;

#[test]
fn test_from_text_sorts_symbols_and_appends_end() {
    let vocabulary = Vocabulary::from_text("banana\nband\r\n");
    assert_eq!(vocabulary.symbols(), &['a', 'b', 'd', 'n', END]);
    assert_eq!(vocabulary.len(), 5);
    assert_eq!(vocabulary.end_index(), 4);
    assert_eq!(vocabulary.end(), END);
    assert_eq!(vocabulary.index_of('n'), Some(3));
    assert_eq!(vocabulary.symbol(1), Some('b'));
    assert_eq!(vocabulary.index_of('\n'), None);
    assert_eq!(vocabulary.symbol(5), None);
}

#[test]
fn test_new_keeps_order_and_rejects_duplicates() {
    let vocabulary = Vocabulary::new(&['z', 'a']).unwrap();
    assert_eq!(vocabulary.index_of('z'), Some(0));
    assert_eq!(vocabulary.index_of(END), Some(2));
    assert!(!vocabulary.is_empty());

    assert!(Vocabulary::new(&['a', 'a']).is_err());
    assert!(Vocabulary::new(&['a', END]).is_err());
}

#[test]
fn test_encode_maps_symbols_and_rejects_unknown_ones() {
    let vocabulary = Vocabulary::new(&['a', 'b', 'c']).unwrap();
    let sequence = Vocabulary::sequence_with_end("cab");
    assert_eq!(sequence, vec!['c', 'a', 'b', END]);
    assert_eq!(vocabulary.encode(&sequence).unwrap(), vec![2, 0, 1, 3]);
    assert!(matches!(
        vocabulary.encode(&['a', 'x']),
        Err(ModelError::InputValidationError(_))
    ));
}
