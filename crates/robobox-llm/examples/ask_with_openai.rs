//! Example: run both RoboBox flows against OpenAI
//!
//! Prerequisites:
//! - Set the OPENAI_API_KEY environment variable
//!
//! Run with:
//! ```bash
//! export OPENAI_API_KEY=your-api-key
//! cargo run --example ask_with_openai
//! ```

use robobox_llm::{
    DiscountFlow, DiscountFlowConfig, FaqFlow, FaqFlowConfig, OpenAIProvider, StaticQaRetriever,
};
use std::env;
use std::sync::Arc;
use std::time::Duration;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    println!("=== RoboBox Flows with OpenAI ===\n");

    let api_key = env::var("OPENAI_API_KEY").unwrap_or_else(|_| {
        eprintln!("Error: OPENAI_API_KEY environment variable not set");
        eprintln!("Please set it with: export OPENAI_API_KEY=your-api-key");
        std::process::exit(1);
    });
    let provider = Arc::new(OpenAIProvider::new(api_key));

    let discount_flow = DiscountFlow::new(
        provider.clone(),
        DiscountFlowConfig::new("gpt-4o-mini").with_timeout(Duration::from_secs(10)),
    );
    match discount_flow.generate().await {
        Ok(discount) => println!("Discount: {} ({}% off)\n", discount.code, discount.percentage),
        Err(e) => eprintln!("Discount generation failed: {}\n", e),
    }

    let faq_flow = FaqFlow::new(
        provider,
        Arc::new(StaticQaRetriever::default()),
        FaqFlowConfig::new("gpt-4o-mini").with_timeout(Duration::from_secs(15)),
    );
    let questions = [
        "What products does RoboBox Reimagined offer?",
        "How can schools register for RoboBox Reimagined?",
        "Do you run workshops for beginners?",
    ];
    for question in questions {
        println!("Q: {}", question);
        match faq_flow.answer(question).await {
            Ok(answer) => println!("A: {}\n", answer.answer),
            Err(e) => eprintln!("Error: {}\n", e),
        }
    }

    Ok(())
}
