pub mod archive;
pub mod compressor;
pub mod decompressor;
pub mod fasta;
pub mod kmer;
pub mod matching;
pub mod progress;
pub mod sequence;
pub mod summary;
pub mod transcript;

#[doc(hidden)]
pub mod _internal_test_data;
