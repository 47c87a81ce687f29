mod test_derivation;
