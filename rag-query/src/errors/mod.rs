pub mod rag_query_error;
