mod chunk_helpers;
mod read_bad;
