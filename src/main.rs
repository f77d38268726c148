#[actix_web::main]
async fn main() -> std::io::Result<()> {
    curriculum_ingest::run().await
}
