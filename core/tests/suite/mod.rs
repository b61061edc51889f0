mod crawl_http;
mod events_http;
mod find_key_http;
mod watch_http;
