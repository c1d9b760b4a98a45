//! Operator-facing console text.

pub const BANNER: &str = r"
+------------------------------------------------------------------------------+
|                            Enhanced CADENCE Demo                             |
|                     Hyper-Personalized E-commerce Search                     |
+------------------------------------------------------------------------------+
|  Real-time query autocompletion       Personalized search results            |
|  Model-powered suggestions            Engagement tracking and analytics      |
|  Clustering-based categories          A/B testing switches                   |
+------------------------------------------------------------------------------+
";

/// Shown once the artifacts are verified, right before serving.
pub fn instructions(address: &str) -> String {
    format!(
        r#"
Demo instructions
=================

1. Open http://{address} in a browser.

2. Try searching for:
   - "laptop"      gaming, programming and business suggestions
   - "headphones"  wireless, bluetooth and noise-cancelling options
   - "shoes"       running, casual and sports recommendations
   - "phone"       case, charger and accessory suggestions

3. Personalization:
   - change the user ID to see different personalized results
   - use the engagement buttons to simulate interactions

4. Health: GET http://{address}/health (or `cadence-cli health`)

Press Ctrl+C to stop the demo server.
"#
    )
}

pub fn print_banner() {
    println!("{BANNER}");
}

pub fn print_instructions(address: &str) {
    println!("{}", instructions(address));
}

pub fn print_farewell() {
    println!("\nThanks for trying Enhanced CADENCE!");
    println!("For more information, check out the README.md file\n");
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_instructions_mention_address() {
        let text = instructions("localhost:8000");
        assert!(text.contains("http://localhost:8000"));
        assert!(text.contains("Ctrl+C"));
    }
}
