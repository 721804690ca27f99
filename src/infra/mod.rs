pub mod goodreads;
