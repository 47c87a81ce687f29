mod test_iso_formats;
mod test_visa_formats;
