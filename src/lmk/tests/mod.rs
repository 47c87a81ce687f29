mod test_key_block;
mod test_key_type;
