mod test_parity;
