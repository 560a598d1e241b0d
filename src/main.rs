use chanstats::error::AppResult;

fn main() -> AppResult<()> {
    chanstats::run()
}
