/*!
 * Mock Driver
 * In-memory driver with failure injection for exercising the proxies
 */

use std::cell::{Cell, RefCell};
use std::rc::Rc;
use tether::{
    DriverError, DriverResult, RawCallableStatement, RawConnection, RawDatabaseMetadata,
    RawPreparedStatement, RawStatement, Row, Value,
};

/// Shared switchboard observing one mock connection and everything
/// derived from it
#[derive(Default)]
pub struct MockState {
    pub statements_opened: Cell<u32>,
    /// Close attempts on statements, successful or not
    pub statement_close_attempts: Cell<u32>,
    pub cancels: Cell<u32>,
    pub connection_closed: Cell<bool>,
    /// Failure handed to the next forwarded driver call
    pub fail_next: RefCell<Option<DriverError>>,
}

pub type StateRef = Rc<MockState>;

impl MockState {
    pub fn new() -> StateRef {
        Rc::new(Self::default())
    }

    pub fn inject(&self, error: DriverError) {
        *self.fail_next.borrow_mut() = Some(error);
    }

    fn take_injected(&self) -> DriverResult<()> {
        match self.fail_next.borrow_mut().take() {
            Some(error) => Err(error),
            None => Ok(()),
        }
    }
}

pub struct MockConnection {
    pub state: StateRef,
    /// Bumped through the escape hatch in tests
    pub touched: u32,
}

impl MockConnection {
    pub fn new(state: &StateRef) -> Self {
        Self {
            state: state.clone(),
            touched: 0,
        }
    }
}

pub struct MockStatement {
    state: StateRef,
    pub fail_close: bool,
    pub bound: Vec<(usize, Value)>,
    pub out_params: Vec<usize>,
}

impl MockStatement {
    fn new(state: &StateRef) -> Self {
        state.statements_opened.set(state.statements_opened.get() + 1);
        Self {
            state: state.clone(),
            fail_close: false,
            bound: Vec::new(),
            out_params: Vec::new(),
        }
    }
}

pub struct MockMetadata;

impl RawStatement for MockStatement {
    fn execute(&mut self, _sql: &str) -> DriverResult<u64> {
        self.state.take_injected()?;
        Ok(1)
    }

    fn query(&mut self, _sql: &str) -> DriverResult<Vec<Row>> {
        self.state.take_injected()?;
        Ok(vec![vec![Value::from(1i64)]])
    }

    fn cancel(&mut self) -> DriverResult<()> {
        self.state.cancels.set(self.state.cancels.get() + 1);
        Ok(())
    }

    fn close(&mut self) -> DriverResult<()> {
        self.state
            .statement_close_attempts
            .set(self.state.statement_close_attempts.get() + 1);
        if self.fail_close {
            return Err(DriverError::access(None, "close refused"));
        }
        Ok(())
    }
}

impl RawPreparedStatement for MockStatement {
    fn bind(&mut self, index: usize, value: Value) -> DriverResult<()> {
        self.bound.push((index, value));
        Ok(())
    }

    fn execute_prepared(&mut self) -> DriverResult<u64> {
        self.state.take_injected()?;
        Ok(self.bound.len() as u64)
    }

    fn query_prepared(&mut self) -> DriverResult<Vec<Row>> {
        self.state.take_injected()?;
        Ok(vec![self.bound.iter().map(|(_, v)| v.clone()).collect()])
    }
}

impl RawCallableStatement for MockStatement {
    fn register_out_param(&mut self, index: usize) -> DriverResult<()> {
        self.out_params.push(index);
        Ok(())
    }

    fn out_param(&self, index: usize) -> DriverResult<Value> {
        if self.out_params.contains(&index) {
            Ok(Value::from(index as i64))
        } else {
            Err(DriverError::misuse(format!(
                "out parameter {index} not registered"
            )))
        }
    }
}

impl RawDatabaseMetadata for MockMetadata {
    fn product_name(&self) -> DriverResult<String> {
        Ok("MockDB".to_string())
    }

    fn product_version(&self) -> DriverResult<String> {
        Ok("1.0".to_string())
    }

    fn driver_name(&self) -> DriverResult<String> {
        Ok("tether-mock".to_string())
    }

    fn user_name(&self) -> DriverResult<String> {
        Ok("tester".to_string())
    }
}

impl RawConnection for MockConnection {
    type Statement = MockStatement;
    type Prepared = MockStatement;
    type Callable = MockStatement;
    type Metadata = MockMetadata;

    fn create_statement(&mut self) -> DriverResult<MockStatement> {
        self.state.take_injected()?;
        Ok(MockStatement::new(&self.state))
    }

    fn prepare_statement(&mut self, _sql: &str) -> DriverResult<MockStatement> {
        self.state.take_injected()?;
        Ok(MockStatement::new(&self.state))
    }

    fn prepare_call(&mut self, _sql: &str) -> DriverResult<MockStatement> {
        self.state.take_injected()?;
        Ok(MockStatement::new(&self.state))
    }

    fn database_metadata(&mut self) -> DriverResult<MockMetadata> {
        self.state.take_injected()?;
        Ok(MockMetadata)
    }

    fn commit(&mut self) -> DriverResult<()> {
        self.state.take_injected()
    }

    fn rollback(&mut self) -> DriverResult<()> {
        self.state.take_injected()
    }

    fn set_auto_commit(&mut self, _enabled: bool) -> DriverResult<()> {
        self.state.take_injected()
    }

    fn auto_commit(&self) -> DriverResult<bool> {
        Ok(true)
    }

    fn close(&mut self) -> DriverResult<()> {
        self.state.take_injected()?;
        self.state.connection_closed.set(true);
        Ok(())
    }
}
